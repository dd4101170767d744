//! Watch rules

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

use gantry_core::config::WatchRuleConfig;

use crate::error::WatchError;

/// A root-relative glob and the task it triggers
#[derive(Debug, Clone)]
pub struct WatchRule {
    glob: String,
    task: String,
    matcher: GlobMatcher,
}

impl WatchRule {
    /// Compile a rule. `*` does not cross directory separators; `**` does.
    pub fn new(glob: impl Into<String>, task: impl Into<String>) -> Result<Self, WatchError> {
        let glob = glob.into();
        let matcher = GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .map_err(|e| WatchError::InvalidGlob {
                glob: glob.clone(),
                message: e.to_string(),
            })?
            .compile_matcher();

        Ok(Self {
            glob,
            task: task.into(),
            matcher,
        })
    }

    /// Compile every configured rule
    pub fn from_config(rules: &[WatchRuleConfig]) -> Result<Vec<Self>, WatchError> {
        rules
            .iter()
            .map(|rule| Self::new(rule.glob.as_str(), rule.task.as_str()))
            .collect()
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Whether a root-relative path matches this rule
    pub fn matches(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }
}
