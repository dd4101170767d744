//! Error types for Gantry

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Profile selection errors
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Transform errors
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the environment profile store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// The requested profile is not defined
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// A transform asked for the active profile before one was selected
    #[error("No profile has been selected")]
    ProfileNotSet,

    /// A different profile was already selected for this process
    #[error("Profile '{active}' is already active, cannot switch to '{requested}'")]
    AlreadyActive { active: String, requested: String },
}

/// Classification of a failure, surfaced in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad task graph, bad profile, bad pattern
    Configuration,
    /// Malformed source handed to a compile transform
    Compile,
    /// Unreadable source, unwritable destination, or a transform that died mid-run
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Compile => "compile",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by transform functions
#[derive(Debug, Error)]
pub enum TransformError {
    /// Source could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source is malformed
    #[error("{message}")]
    Compile {
        file: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Glob or filter pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Active profile unavailable
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Background work was cancelled before it finished
    #[error("Interrupted: {0}")]
    Interrupted(String),
}

impl TransformError {
    /// Create a read error for a path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for a path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a compile error
    pub fn compile(file: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Compile {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } | Self::Write { .. } | Self::Interrupted(_) => ErrorKind::Io,
            Self::Compile { .. } => ErrorKind::Compile,
            Self::Pattern { .. } | Self::Profile(_) => ErrorKind::Configuration,
        }
    }

    /// File the failure originated from, if any
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Compile { file, .. } => Some(file),
            Self::Pattern { .. } | Self::Profile(_) | Self::Interrupted(_) => None,
        }
    }

    /// 1-based line number, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Compile { line, .. } => *line,
            _ => None,
        }
    }
}
