//! Gantry Watch - Re-run tasks when source files change
//!
//! A [`Subscription`] delivers root-relative [`ChangeEvent`]s, either from the
//! filesystem or pushed by hand. The [`WatchController`] maps each event
//! through its [`WatchRule`]s onto task names and runs them through the
//! orchestrator.

pub mod controller;
pub mod error;
pub mod event;
mod paths;
pub mod rule;
pub mod subscription;

pub use controller::{WatchController, WatchState};
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind};
pub use rule::WatchRule;
pub use subscription::{EventSender, Subscription};
