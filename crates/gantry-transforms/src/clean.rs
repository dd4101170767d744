//! Clean transform

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use gantry_core::config::CleanGroup;
use gantry_core::TransformError;
use gantry_tasks::{Action, RunContext};

/// Empty each target directory, or remove it entirely when `remove_roots`.
///
/// Missing targets are skipped. Returns the paths that were removed.
#[instrument(skip_all, fields(targets = targets.len(), remove_roots = remove_roots))]
pub fn clean(targets: &[PathBuf], remove_roots: bool) -> Result<Vec<PathBuf>, TransformError> {
    let mut removed = Vec::new();

    for target in targets {
        if !target.exists() {
            debug!(path = %target.display(), "nothing to clean");
            continue;
        }

        if remove_roots {
            remove(target)?;
            removed.push(target.clone());
            continue;
        }

        let entries = fs::read_dir(target).map_err(|e| TransformError::read(target, e))?;
        for entry in entries {
            let path = entry.map_err(|e| TransformError::read(target, e))?.path();
            remove(&path)?;
            removed.push(path);
        }
    }

    removed.sort();
    Ok(removed)
}

fn remove(path: &std::path::Path) -> Result<(), TransformError> {
    let result = if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| TransformError::write(path, e))
}

/// Atomic task adapter for a clean group
#[derive(Debug, Clone)]
pub struct CleanAction {
    group: CleanGroup,
}

impl CleanAction {
    pub fn new(group: CleanGroup) -> Self {
        Self { group }
    }
}

#[async_trait]
impl Action for CleanAction {
    fn describe(&self) -> String {
        let targets: Vec<_> = self
            .group
            .targets
            .iter()
            .map(|t| t.display().to_string())
            .collect();
        let verb = if self.group.remove_roots {
            "remove"
        } else {
            "empty"
        };
        format!("{} {}", verb, targets.join(", "))
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TransformError> {
        let targets: Vec<PathBuf> = self.group.targets.iter().map(|t| ctx.resolve(t)).collect();
        let remove_roots = self.group.remove_roots;

        let removed = crate::blocking(move || clean(&targets, remove_roots)).await?;

        if removed.is_empty() {
            debug!(group = %self.group.name, "no {} to delete", self.group.description);
        } else {
            let listing: Vec<_> = removed.iter().map(|p| p.display().to_string()).collect();
            info!(
                group = %self.group.name,
                "Deleted the following {}:\n{}",
                self.group.description,
                listing.join("\n")
            );
        }
        Ok(())
    }
}
