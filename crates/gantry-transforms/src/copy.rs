//! Copy transform

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use gantry_core::config::CopyMapping;
use gantry_core::TransformError;
use gantry_tasks::{Action, RunContext};

/// A source directory mirrored into a destination directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMapping {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    /// Glob relative to `source_root`
    pub filter: String,
}

impl AssetMapping {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            filter: "**/*".to_string(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    fn matcher(&self) -> Result<GlobMatcher, TransformError> {
        Glob::new(&self.filter)
            .map(|glob| glob.compile_matcher())
            .map_err(|e| TransformError::Pattern {
                pattern: self.filter.clone(),
                message: e.to_string(),
            })
    }
}

/// Mirror every matching file under the source root to the same relative
/// path under the destination root, overwriting existing files. The
/// destination root is created even when nothing matches.
///
/// Returns the written destination paths.
#[instrument(skip_all, fields(source = %mapping.source_root.display()))]
pub fn copy(mapping: &AssetMapping) -> Result<Vec<PathBuf>, TransformError> {
    let matcher = mapping.matcher()?;
    let source_root = &mapping.source_root;

    if !source_root.is_dir() {
        let err = match fs::metadata(source_root) {
            Err(e) => e,
            Ok(_) => std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        };
        return Err(TransformError::read(source_root, err));
    }

    let destination_root = &mapping.destination_root;
    fs::create_dir_all(destination_root).map_err(|e| TransformError::write(destination_root, e))?;

    let mut copied = Vec::new();

    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_root.as_path()).to_path_buf();
            TransformError::read(path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        if !matcher.is_match(relative) {
            debug!(path = %relative.display(), "filtered out");
            continue;
        }

        let target = destination_root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| TransformError::write(parent, e))?;
        }
        fs::copy(entry.path(), &target).map_err(|e| TransformError::write(&target, e))?;
        copied.push(target);
    }

    Ok(copied)
}

/// Atomic task adapter for a copy mapping
#[derive(Debug, Clone)]
pub struct CopyAction {
    mapping: CopyMapping,
}

impl CopyAction {
    pub fn new(mapping: CopyMapping) -> Self {
        Self { mapping }
    }
}

#[async_trait]
impl Action for CopyAction {
    fn describe(&self) -> String {
        format!(
            "copy {}/{} to {}",
            self.mapping.source.display(),
            self.mapping.filter,
            self.mapping.destination.display()
        )
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TransformError> {
        let mapping = AssetMapping::new(
            ctx.resolve(&self.mapping.source),
            ctx.resolve(&self.mapping.destination),
        )
        .with_filter(self.mapping.filter.clone());

        let copied = crate::blocking(move || copy(&mapping)).await?;
        info!(
            files = copied.len(),
            "Copied {}",
            if self.mapping.description.is_empty() {
                &self.mapping.name
            } else {
                &self.mapping.description
            }
        );
        Ok(())
    }
}
