//! Exit codes for the CLI

use gantry_core::{ConfigError, GantryError, ProfileError};
use gantry_tasks::GraphError;
use gantry_watch::WatchError;

use crate::error::CliError;

/// Success
pub const SUCCESS: i32 = 0;

/// A task failed, or any other runtime error
pub const ERROR: i32 = 1;

/// Configuration error: bad config file, unknown task or profile, bad watch rule
pub const CONFIG_ERROR: i32 = 2;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Map an error onto the process exit code
pub fn for_error(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return match e {
                CliError::TaskFailed { .. } => ERROR,
                CliError::Interrupted => CANCELLED,
            };
        }
        if let Some(e) = cause.downcast_ref::<GantryError>() {
            return match e {
                GantryError::Config(_) | GantryError::Profile(_) => CONFIG_ERROR,
                GantryError::Transform(_) => ERROR,
            };
        }
        if cause.is::<ConfigError>() || cause.is::<ProfileError>() || cause.is::<GraphError>() {
            return CONFIG_ERROR;
        }
        if let Some(e) = cause.downcast_ref::<WatchError>() {
            return if e.is_configuration() {
                CONFIG_ERROR
            } else {
                ERROR
            };
        }
    }
    ERROR
}
