//! Environment profiles and the write-once profile store
//!
//! A profile bundles the compilation options for stylesheets and scripts.
//! Exactly one profile is selected per process; transforms look it up when
//! they run, so tasks can be declared before the profile is known.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProfileError;

/// Name of the development profile
pub const DEVELOPMENT: &str = "development";

/// Name of the production profile
pub const PRODUCTION: &str = "production";

/// Output style of compiled stylesheets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Human readable, one declaration per line
    #[default]
    Expanded,
    /// Everything on as few bytes as possible
    Compressed,
}

/// Stylesheet compilation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssOptions {
    /// Output style
    pub output_style: OutputStyle,

    /// Prefix each output with a comment naming its source
    pub source_comments: bool,

    /// Write a `.css.map` next to each output
    pub source_maps: bool,

    /// Silence `@warn` and `@debug` output from the compiler
    pub quiet: bool,

    /// Directories searched for `@use` / `@import`, in order
    pub include_paths: Vec<PathBuf>,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            output_style: OutputStyle::Expanded,
            source_comments: false,
            source_maps: false,
            quiet: false,
            include_paths: Vec::new(),
        }
    }
}

/// Script bundling options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsOptions {
    /// Strip comments and insignificant whitespace
    pub minify: bool,

    /// Keep comments even when minifying
    pub preserve_comments: bool,

    /// Write a source map into the maps directory
    pub emit_source_map: bool,
}

impl Default for JsOptions {
    fn default() -> Self {
        Self {
            minify: false,
            preserve_comments: true,
            emit_source_map: true,
        }
    }
}

/// Resolved settings of a single profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileSettings {
    /// Stylesheet options
    pub css: CssOptions,

    /// Script options
    pub js: JsOptions,
}

impl ProfileSettings {
    /// Defaults used by `gantry build --profile development`
    pub fn development() -> Self {
        Self {
            css: CssOptions {
                output_style: OutputStyle::Expanded,
                source_comments: true,
                source_maps: false,
                quiet: false,
                include_paths: default_include_paths(),
            },
            js: JsOptions {
                minify: false,
                preserve_comments: true,
                emit_source_map: true,
            },
        }
    }

    /// Defaults used by `gantry build --profile production`
    pub fn production() -> Self {
        Self {
            css: CssOptions {
                output_style: OutputStyle::Compressed,
                source_comments: false,
                source_maps: false,
                quiet: true,
                include_paths: default_include_paths(),
            },
            js: JsOptions {
                minify: true,
                preserve_comments: false,
                emit_source_map: true,
            },
        }
    }
}

/// Profile settings as written in configuration.
///
/// Every field is optional; [`ProfileOverride::apply`] lays the fields that
/// are present over a named profile's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub css: CssOverride,
    pub js: JsOverride,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CssOverride {
    pub output_style: Option<OutputStyle>,
    pub source_comments: Option<bool>,
    pub source_maps: Option<bool>,
    pub quiet: Option<bool>,
    pub include_paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsOverride {
    pub minify: Option<bool>,
    pub preserve_comments: Option<bool>,
    pub emit_source_map: Option<bool>,
}

impl ProfileOverride {
    /// Apply the fields that were given on top of `base`
    pub fn apply(self, base: ProfileSettings) -> ProfileSettings {
        let ProfileSettings { css, js } = base;
        let CssOverride {
            output_style,
            source_comments,
            source_maps,
            quiet,
            include_paths,
        } = self.css;
        let JsOverride {
            minify,
            preserve_comments,
            emit_source_map,
        } = self.js;

        ProfileSettings {
            css: CssOptions {
                output_style: output_style.unwrap_or(css.output_style),
                source_comments: source_comments.unwrap_or(css.source_comments),
                source_maps: source_maps.unwrap_or(css.source_maps),
                quiet: quiet.unwrap_or(css.quiet),
                include_paths: include_paths.unwrap_or(css.include_paths),
            },
            js: JsOptions {
                minify: minify.unwrap_or(js.minify),
                preserve_comments: preserve_comments.unwrap_or(js.preserve_comments),
                emit_source_map: emit_source_map.unwrap_or(js.emit_source_map),
            },
        }
    }
}

fn default_include_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("app/assets/scss"),
        PathBuf::from("node_modules/govuk-frontend"),
    ]
}

/// A named, resolved profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile name
    pub name: String,
    /// Stylesheet options
    pub css: CssOptions,
    /// Script options
    pub js: JsOptions,
}

impl Profile {
    pub fn new(name: impl Into<String>, settings: ProfileSettings) -> Self {
        Self {
            name: name.into(),
            css: settings.css,
            js: settings.js,
        }
    }
}

/// Holds every known profile and the one selected for this process.
///
/// Shared behind an `Arc` by everything that runs transforms. The active
/// slot is written once; concurrent readers never observe it changing.
#[derive(Debug)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Arc<Profile>>,
    active: OnceLock<Arc<Profile>>,
}

impl ProfileStore {
    /// Create a store from a set of profiles
    pub fn new(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.name.clone(), Arc::new(p)))
                .collect(),
            active: OnceLock::new(),
        }
    }

    /// Store holding the built-in development and production profiles
    pub fn builtin() -> Self {
        Self::new([
            Profile::new(DEVELOPMENT, ProfileSettings::development()),
            Profile::new(PRODUCTION, ProfileSettings::production()),
        ])
    }

    /// Names of all known profiles, sorted
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Select the active profile.
    ///
    /// Selecting the profile that is already active is a no-op; selecting a
    /// different one afterwards fails.
    pub fn set_active(&self, name: &str) -> Result<Arc<Profile>, ProfileError> {
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ProfileError::UnknownProfile {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;

        let active = self.active.get_or_init(|| {
            info!(profile = name, "selected profile");
            profile.clone()
        });

        if active.name != name {
            return Err(ProfileError::AlreadyActive {
                active: active.name.clone(),
                requested: name.to_string(),
            });
        }

        debug!(profile = name, "profile active");
        Ok(active.clone())
    }

    /// The active profile
    pub fn active(&self) -> Result<Arc<Profile>, ProfileError> {
        self.active.get().cloned().ok_or(ProfileError::ProfileNotSet)
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::builtin()
    }
}
