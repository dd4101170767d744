//! Script bundling

pub mod bundle;
mod minify;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};

use gantry_core::config::ScriptsConfig;
use gantry_core::{JsOptions, TransformError};
use gantry_tasks::{Action, RunContext};

use crate::fs::{relative_url, write_atomic};
use crate::sourcemap::{LineOrigin, SourceMap};

pub use bundle::{Bundle, BundleLine};
pub use minify::Minifier;

/// Where a script bundle comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle {
    /// Entry file
    pub entry: PathBuf,
    /// Output directory
    pub destination: PathBuf,
    /// Source map directory, relative to `destination`
    pub maps_dir: PathBuf,
    /// Output file name
    pub name: String,
}

impl ScriptBundle {
    pub fn new(entry: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let entry = entry.into();
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle.js".to_string());
        Self {
            entry,
            destination: destination.into(),
            maps_dir: PathBuf::from("maps"),
            name,
        }
    }

    pub fn with_maps_dir(mut self, maps_dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = maps_dir.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.destination.join(&self.name)
    }

    pub fn map_path(&self) -> PathBuf {
        self.destination
            .join(&self.maps_dir)
            .join(format!("{}.map", self.name))
    }
}

/// Files written by a script compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptsOutput {
    pub bundle: PathBuf,
    pub source_map: Option<PathBuf>,
    /// Lines in the written bundle, excluding the source map reference
    pub lines: usize,
}

/// Resolve includes, strip according to `options` and write the bundle.
///
/// Nothing is written when an include cannot be resolved.
#[instrument(skip_all, fields(entry = %target.entry.display(), minify = options.minify))]
pub fn compile_scripts(
    target: &ScriptBundle,
    options: &JsOptions,
) -> Result<ScriptsOutput, TransformError> {
    let bundle = bundle::resolve(&target.entry)?;

    let mut lines: Vec<String> = Vec::with_capacity(bundle.lines.len());
    let mut origins: Vec<LineOrigin> = Vec::with_capacity(bundle.lines.len());

    let mut minifier = (options.minify || !options.preserve_comments)
        .then(|| Minifier::new(options.minify, options.preserve_comments));

    for line in &bundle.lines {
        let text = match minifier.as_mut() {
            Some(minifier) => match minifier.line(&line.text) {
                Some(text) => text,
                None => continue,
            },
            None => line.text.clone(),
        };
        lines.push(text);
        origins.push(LineOrigin {
            source: line.source,
            line: line.line,
        });
    }

    let mut js = lines.join("\n");
    js.push('\n');

    let output = target.output_path();
    let mut map = None;

    if options.emit_source_map {
        let map_path = target.map_path();
        let map_dir = target.destination.join(&target.maps_dir);
        let sources = bundle
            .sources
            .iter()
            .map(|source| relative_url(&map_dir, source))
            .collect();
        let json = serde_json::to_string(&SourceMap::from_lines(&target.name, sources, &origins))
            .map_err(|e| {
                TransformError::write(
                    &map_path,
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                )
            })?;

        js.push_str(&format!(
            "//# sourceMappingURL={}\n",
            relative_url(&target.destination, &map_path)
        ));
        map = Some((map_path, json));
    }

    write_atomic(&output, js.as_bytes())?;
    let source_map = match map {
        Some((path, json)) => {
            write_atomic(&path, json.as_bytes())?;
            Some(path)
        }
        None => None,
    };

    Ok(ScriptsOutput {
        bundle: output,
        source_map,
        lines: lines.len(),
    })
}

/// Atomic task adapter for script bundling
#[derive(Debug, Clone)]
pub struct ScriptsAction {
    scripts: ScriptsConfig,
}

impl ScriptsAction {
    pub fn new(scripts: ScriptsConfig) -> Self {
        Self { scripts }
    }

    fn target(&self, root: impl Fn(&Path) -> PathBuf) -> ScriptBundle {
        let mut target = ScriptBundle::new(
            root(self.scripts.entry.as_path()),
            root(self.scripts.destination.as_path()),
        )
        .with_maps_dir(self.scripts.maps_dir.clone());
        if let Some(name) = &self.scripts.output {
            target = target.with_name(name.clone());
        }
        target
    }
}

#[async_trait]
impl Action for ScriptsAction {
    fn describe(&self) -> String {
        let target = self.target(Path::to_path_buf);
        format!(
            "bundle {} to {}",
            target.entry.display(),
            target.output_path().display()
        )
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TransformError> {
        let profile = ctx.profile()?;
        let options = profile.js.clone();
        let target = self.target(|path| ctx.resolve(path));

        let output = crate::blocking(move || compile_scripts(&target, &options)).await?;

        if profile.js.minify {
            info!("Compressed JavaScript saved as {}", output.bundle.display());
        } else {
            info!("JavaScript saved as {}", output.bundle.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::{ErrorKind, ProfileStore};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        let js = temp.path().join("assets/javascripts");
        fs::create_dir_all(js.join("vendor")).unwrap();
        fs::write(
            js.join("vendor/lib.js"),
            "/* vendored */\nfunction lib () {\n  return 1;\n}\n",
        )
        .unwrap();
        fs::write(
            js.join("application.js"),
            "//= include vendor/lib.js\n\n// boot\nlib();\n",
        )
        .unwrap();
        temp
    }

    fn target(root: &Path) -> ScriptBundle {
        ScriptBundle::new(
            root.join("assets/javascripts/application.js"),
            root.join("static/javascripts"),
        )
    }

    #[test]
    fn test_minified_bundle_with_map() {
        let temp = setup();
        let target = target(temp.path());
        let options = JsOptions {
            minify: true,
            preserve_comments: false,
            emit_source_map: true,
        };

        let output = compile_scripts(&target, &options).unwrap();

        assert_eq!(output.bundle, temp.path().join("static/javascripts/application.js"));
        assert_eq!(output.lines, 4);
        let js = fs::read_to_string(&output.bundle).unwrap();
        assert_eq!(
            js,
            "function lib(){\nreturn 1;\n}\nlib();\n//# sourceMappingURL=maps/application.js.map\n"
        );

        let map_path = output.source_map.unwrap();
        assert_eq!(
            map_path,
            temp.path().join("static/javascripts/maps/application.js.map")
        );
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(map_path).unwrap()).unwrap();
        assert_eq!(map["file"], "application.js");
        assert_eq!(
            map["sources"],
            serde_json::json!([
                "../../../assets/javascripts/application.js",
                "../../../assets/javascripts/vendor/lib.js"
            ])
        );
        // 0-based: lib.js lines 1 to 3, then application.js line 3
        assert_eq!(map["mappings"], "ACCA;AACA;AACA;ADAA");
    }

    #[test]
    fn test_minified_template_literal_is_unchanged() {
        let temp = setup();
        fs::write(
            temp.path().join("assets/javascripts/application.js"),
            "var t = `first\n\n   indented`;\n",
        )
        .unwrap();
        let options = JsOptions {
            minify: true,
            preserve_comments: false,
            emit_source_map: false,
        };

        let output = compile_scripts(&target(temp.path()), &options).unwrap();

        assert_eq!(output.lines, 3);
        assert_eq!(
            fs::read_to_string(&output.bundle).unwrap(),
            "var t=`first\n\n   indented`;\n"
        );
    }

    #[test]
    fn test_unminified_bundle_keeps_everything() {
        let temp = setup();
        let options = JsOptions {
            minify: false,
            preserve_comments: true,
            emit_source_map: false,
        };

        let output = compile_scripts(&target(temp.path()), &options).unwrap();

        assert!(output.source_map.is_none());
        let js = fs::read_to_string(&output.bundle).unwrap();
        assert_eq!(
            js,
            "/* vendored */\nfunction lib () {\n  return 1;\n}\n\n// boot\nlib();\n"
        );
    }

    #[test]
    fn test_unresolved_include_writes_nothing() {
        let temp = setup();
        fs::write(
            temp.path().join("assets/javascripts/application.js"),
            "lib();\n//= require missing\n",
        )
        .unwrap();

        let err = compile_scripts(&target(temp.path()), &JsOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Compile);
        assert_eq!(err.line(), Some(2));
        assert!(!temp.path().join("static").exists());
    }

    #[test]
    fn test_custom_name_and_maps_dir() {
        let target = ScriptBundle::new("src/app.js", "out")
            .with_name("bundle.min.js")
            .with_maps_dir("sourcemaps");
        assert_eq!(target.output_path(), PathBuf::from("out/bundle.min.js"));
        assert_eq!(
            target.map_path(),
            PathBuf::from("out/sourcemaps/bundle.min.js.map")
        );
    }

    #[tokio::test]
    async fn test_action_uses_active_profile() {
        let temp = setup();
        let ctx = RunContext::new(Arc::new(ProfileStore::builtin())).with_root(temp.path());
        ctx.profiles.set_active("development").unwrap();

        let action = ScriptsAction::new(ScriptsConfig {
            entry: PathBuf::from("assets/javascripts/application.js"),
            destination: PathBuf::from("static/javascripts"),
            ..ScriptsConfig::default()
        });
        action.run(&ctx).await.unwrap();

        let js =
            fs::read_to_string(temp.path().join("static/javascripts/application.js")).unwrap();
        assert!(js.contains("function lib () {"));
        assert!(temp
            .path()
            .join("static/javascripts/maps/application.js.map")
            .is_file());
    }
}
