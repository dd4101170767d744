//! Gantry Core - Core library for the Gantry asset pipeline
//!
//! This crate provides the configuration model, the environment profile
//! store and the error types shared by the task, transform and watch crates.

pub mod config;
pub mod error;
pub mod profile;

pub use error::{ConfigError, ErrorKind, GantryError, ProfileError, Result, TransformError};
pub use profile::{
    CssOptions, CssOverride, JsOptions, JsOverride, OutputStyle, Profile, ProfileOverride,
    ProfileSettings, ProfileStore, DEVELOPMENT, PRODUCTION,
};
