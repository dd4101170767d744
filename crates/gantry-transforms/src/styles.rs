//! Stylesheet compilation with grass

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use gantry_core::config::StylesConfig;
use gantry_core::{CssOptions, OutputStyle, TransformError};
use gantry_tasks::{Action, RunContext};

use crate::fs::{relative_url, write_atomic};
use crate::sourcemap::SourceMap;

/// Files written by a stylesheet compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylesOutput {
    pub stylesheets: Vec<PathBuf>,
    pub source_maps: Vec<PathBuf>,
}

struct Compiled {
    source: PathBuf,
    css_path: PathBuf,
    css: String,
    map: Option<(PathBuf, String)>,
}

/// Compile every stylesheet matching `source_glob` into `destination`.
///
/// Every source is compiled before anything is written, so a syntax error in
/// any of them leaves the destination untouched.
#[instrument(skip(options), fields(style = ?options.output_style))]
pub fn compile_styles(
    source_glob: &str,
    destination: &Path,
    options: &CssOptions,
) -> Result<StylesOutput, TransformError> {
    let sources = expand_glob(source_glob)?;
    if sources.is_empty() {
        warn!(pattern = source_glob, "no stylesheets matched");
        return Ok(StylesOutput::default());
    }

    let compiled = sources
        .iter()
        .map(|source| compile_one(source, destination, options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut output = StylesOutput::default();
    for item in compiled {
        write_atomic(&item.css_path, item.css.as_bytes())?;
        debug!(source = %item.source.display(), output = %item.css_path.display(), "wrote stylesheet");
        output.stylesheets.push(item.css_path);

        if let Some((map_path, map)) = item.map {
            write_atomic(&map_path, map.as_bytes())?;
            output.source_maps.push(map_path);
        }
    }

    Ok(output)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, TransformError> {
    let invalid = |message: String| TransformError::Pattern {
        pattern: pattern.to_string(),
        message,
    };

    let mut sources = Vec::new();
    for entry in glob::glob(pattern).map_err(|e| invalid(e.to_string()))? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            TransformError::read(path, e.into())
        })?;
        if path.is_file() {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

fn compile_one(
    source: &Path,
    destination: &Path,
    options: &CssOptions,
) -> Result<Compiled, TransformError> {
    let style = match options.output_style {
        OutputStyle::Expanded => grass::OutputStyle::Expanded,
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
    };

    let mut grass_options = grass::Options::default().style(style).quiet(options.quiet);
    for include in &options.include_paths {
        grass_options = grass_options.load_path(include);
    }

    let body = grass::from_path(source, &grass_options)
        .map_err(|e| compile_error(source, &e.to_string()))?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "style".to_string());
    let css_name = format!("{}.css", stem);
    let css_path = destination.join(&css_name);

    let mut css = String::new();
    if options.source_comments {
        css.push_str(&format!("/* {} */\n", source.display()));
    }
    css.push_str(&body);
    if !css.ends_with('\n') {
        css.push('\n');
    }

    let map = if options.source_maps {
        let map_name = format!("{}.map", css_name);
        // File-level map: grass does not report output positions
        let map = SourceMap::from_lines(css_name, vec![relative_url(destination, source)], &[]);
        let json = serde_json::to_string(&map).map_err(|e| {
            TransformError::write(
                destination.join(&map_name),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        css.push_str(&format!("/*# sourceMappingURL={} */\n", map_name));
        Some((destination.join(map_name), json))
    } else {
        None
    };

    Ok(Compiled {
        source: source.to_path_buf(),
        css_path,
        css,
        map,
    })
}

/// Turn a grass diagnostic into a compile error naming file and line.
///
/// grass renders errors as
///
/// ```text
/// Error: expected ";".
///   ╷
/// 2 │ a { color: red }
///   │                ^
///   ╵
///   path/to/file.scss 2:16  root stylesheet
/// ```
fn compile_error(source: &Path, rendered: &str) -> TransformError {
    let message = rendered
        .lines()
        .next()
        .map(|line| line.trim_start_matches("Error: ").trim().to_string())
        .unwrap_or_else(|| rendered.to_string());

    let location = Regex::new(r"(?m)^\s*(\S.*?) (\d+):(\d+)\s+\S").ok().and_then(|re| {
        re.captures_iter(rendered).last().and_then(|caps| {
            let line = caps[2].parse::<usize>().ok()?;
            Some((PathBuf::from(&caps[1]), line))
        })
    });

    match location {
        Some((file, line)) => TransformError::compile(file, Some(line), message),
        None => TransformError::compile(source, None, message),
    }
}

/// Atomic task adapter for stylesheet compilation
#[derive(Debug, Clone)]
pub struct StylesAction {
    styles: StylesConfig,
}

impl StylesAction {
    pub fn new(styles: StylesConfig) -> Self {
        Self { styles }
    }
}

#[async_trait]
impl Action for StylesAction {
    fn describe(&self) -> String {
        format!(
            "compile {} to {}",
            self.styles.source_glob,
            self.styles.destination.display()
        )
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TransformError> {
        let profile = ctx.profile()?;

        let mut options = profile.css.clone();
        options.include_paths = options
            .include_paths
            .iter()
            .map(|path| ctx.resolve(path))
            .collect();

        let pattern = ctx.resolve(&self.styles.source_glob);
        let pattern = pattern
            .to_str()
            .ok_or_else(|| TransformError::Pattern {
                pattern: pattern.display().to_string(),
                message: "path is not valid UTF-8".to_string(),
            })?
            .to_string();
        let destination = ctx.resolve(&self.styles.destination);

        let output =
            crate::blocking(move || compile_styles(&pattern, &destination, &options)).await?;

        for css in &output.stylesheets {
            match profile.css.output_style {
                OutputStyle::Compressed => info!("Compressed CSS saved to {}", css.display()),
                OutputStyle::Expanded => info!("Expanded CSS saved to {}", css.display()),
            }
        }
        Ok(())
    }
}
