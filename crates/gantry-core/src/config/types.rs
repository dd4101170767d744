//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::profile::{
    Profile, ProfileOverride, ProfileSettings, ProfileStore, DEVELOPMENT, PRODUCTION,
};

/// Main configuration for Gantry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Groups of directories emptied by the `clean` task
    pub clean: Vec<CleanGroup>,

    /// Directories mirrored by the `copy` task
    pub copy: Vec<CopyMapping>,

    /// Stylesheet compilation
    pub styles: StylesConfig,

    /// Script bundling
    pub scripts: ScriptsConfig,

    /// Watch mode
    pub watch: WatchConfig,

    /// Development and production profiles
    pub profiles: ProfilesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clean: vec![
                CleanGroup::new("js", "JavaScript files", ["app/static/javascripts"]),
                CleanGroup::new("css", "CSS files", ["app/static/stylesheets"]),
                CleanGroup::new(
                    "legacy",
                    "legacy directories",
                    [
                        "app/assets/scss/toolkit",
                        "app/templates/toolkit",
                        "app/assets/scss/govuk",
                    ],
                )
                .removing_roots(),
            ],
            copy: vec![
                CopyMapping::new(
                    "frameworks",
                    "frameworks YAML into app folder",
                    "node_modules/digitalmarketplace-frameworks/frameworks",
                    "app/content/frameworks",
                ),
                CopyMapping::new(
                    "images",
                    "image assets from app to static folder",
                    "app/assets/images",
                    "app/static/images",
                ),
                CopyMapping::new(
                    "govuk_frontend_assets:fonts",
                    "fonts from the GOV.UK frontend assets",
                    "node_modules/govuk-frontend/govuk/assets/fonts",
                    "app/static/fonts",
                ),
                CopyMapping::new(
                    "govuk_frontend_assets:images",
                    "images from GOV.UK frontend assets",
                    "node_modules/govuk-frontend/govuk/assets/images",
                    "app/static/images",
                ),
            ],
            styles: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            watch: WatchConfig::default(),
            profiles: ProfilesConfig::default(),
        }
    }
}

/// A named set of directories removed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanGroup {
    /// Group name, the task is registered as `clean:<name>`
    pub name: String,

    /// What the group holds, used in log output
    #[serde(default)]
    pub description: String,

    /// Directories to clean
    pub targets: Vec<PathBuf>,

    /// Remove the directories themselves rather than only their contents
    #[serde(default)]
    pub remove_roots: bool,
}

impl CleanGroup {
    pub fn new<I, P>(name: impl Into<String>, description: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            remove_roots: false,
        }
    }

    pub fn removing_roots(mut self) -> Self {
        self.remove_roots = true;
        self
    }
}

/// A directory mirrored into the output tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyMapping {
    /// Mapping name, the task is registered as `copy:<name>`
    pub name: String,

    /// What is being copied, used in log output
    #[serde(default)]
    pub description: String,

    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Glob relative to `source` selecting the files to copy
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "**/*".to_string()
}

impl CopyMapping {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            source: source.into(),
            destination: destination.into(),
            filter: default_filter(),
        }
    }
}

/// Stylesheet compilation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Task name
    pub task: String,

    /// Glob selecting the entry stylesheets
    pub source_glob: String,

    /// Output directory for compiled stylesheets
    pub destination: PathBuf,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            task: "sass".to_string(),
            source_glob: "app/assets/scss/application*.scss".to_string(),
            destination: PathBuf::from("app/static/stylesheets"),
        }
    }
}

/// Script bundling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Task name
    pub task: String,

    /// Entry file whose includes are resolved into one bundle
    pub entry: PathBuf,

    /// Output directory for the bundle
    pub destination: PathBuf,

    /// Source map directory, relative to `destination`
    pub maps_dir: PathBuf,

    /// Bundle file name, defaults to the entry's file name
    pub output: Option<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            task: "js".to_string(),
            entry: PathBuf::from("app/assets/javascripts/application.js"),
            destination: PathBuf::from("app/static/javascripts"),
            maps_dir: PathBuf::from("maps"),
            output: None,
        }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of filesystem events is delivered
    pub debounce_ms: u64,

    /// Glob to task mappings
    pub rules: Vec<WatchRuleConfig>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            rules: vec![
                WatchRuleConfig::new("app/assets/**/*.js", "js"),
                WatchRuleConfig::new("app/assets/**/*.scss", "sass"),
                WatchRuleConfig::new(
                    "node_modules/digitalmarketplace-frameworks/**",
                    "copy:frameworks",
                ),
            ],
        }
    }
}

/// A single watch rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRuleConfig {
    /// Glob relative to the project root
    pub glob: String,

    /// Task re-run when a matching path changes
    pub task: String,
}

impl WatchRuleConfig {
    pub fn new(glob: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            glob: glob.into(),
            task: task.into(),
        }
    }
}

/// The two named profiles.
///
/// Each profile in the file only lists what it changes; missing fields keep
/// the built-in value of that same profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProfileOverrides")]
pub struct ProfilesConfig {
    pub development: ProfileSettings,
    pub production: ProfileSettings,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ProfileOverrides {
    development: ProfileOverride,
    production: ProfileOverride,
}

impl From<ProfileOverrides> for ProfilesConfig {
    fn from(overrides: ProfileOverrides) -> Self {
        Self {
            development: overrides
                .development
                .apply(ProfileSettings::development()),
            production: overrides.production.apply(ProfileSettings::production()),
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            development: ProfileSettings::development(),
            production: ProfileSettings::production(),
        }
    }
}

impl ProfilesConfig {
    /// Build a profile store with nothing selected yet
    pub fn to_store(&self) -> ProfileStore {
        ProfileStore::new([
            Profile::new(DEVELOPMENT, self.development.clone()),
            Profile::new(PRODUCTION, self.production.clone()),
        ])
    }
}
