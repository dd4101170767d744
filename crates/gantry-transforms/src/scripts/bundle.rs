//! Static include resolution
//!
//! A script may pull other files into the bundle with directive comments:
//!
//! ```text
//! //= include ../vendor/jquery.js
//! //= require components/*.js
//! ```
//!
//! `include` inlines the file every time it appears, `require` at most once
//! per bundle. Paths are relative to the including file and get a `.js`
//! extension when they have none.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use gantry_core::TransformError;

/// One line of the bundle and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLine {
    pub text: String,
    /// Index into [`Bundle::sources`]
    pub source: usize,
    /// 0-based line in the source file
    pub line: usize,
}

/// All lines of an entry file with its includes expanded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub sources: Vec<PathBuf>,
    pub lines: Vec<BundleLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Include,
    Require,
}

/// Resolve `entry` and everything it includes into a single bundle
pub fn resolve(entry: &Path) -> Result<Bundle, TransformError> {
    let mut resolver = Resolver::default();
    resolver.visit(entry)?;
    Ok(resolver.bundle)
}

#[derive(Default)]
struct Resolver {
    bundle: Bundle,
    /// Canonical paths already in the bundle
    seen: HashSet<PathBuf>,
    /// Canonical paths currently being expanded
    stack: Vec<PathBuf>,
}

impl Resolver {
    fn visit(&mut self, file: &Path) -> Result<(), TransformError> {
        let content = fs::read_to_string(file).map_err(|e| TransformError::read(file, e))?;
        let canonical = fs::canonicalize(file).map_err(|e| TransformError::read(file, e))?;

        let source = self.bundle.sources.len();
        self.bundle.sources.push(file.to_path_buf());
        self.seen.insert(canonical.clone());
        self.stack.push(canonical);

        let dir = file.parent().unwrap_or_else(|| Path::new("."));

        for (idx, text) in content.lines().enumerate() {
            let Some((directive, target)) = parse_directive(text) else {
                self.bundle.lines.push(BundleLine {
                    text: text.to_string(),
                    source,
                    line: idx,
                });
                continue;
            };

            for path in expand(dir, target, file, idx + 1)? {
                let canonical =
                    fs::canonicalize(&path).map_err(|e| TransformError::read(&path, e))?;

                if self.stack.contains(&canonical) {
                    return Err(TransformError::compile(
                        file,
                        Some(idx + 1),
                        format!("Include cycle through {}", path.display()),
                    ));
                }
                if directive == Directive::Require && self.seen.contains(&canonical) {
                    trace!(path = %path.display(), "already required");
                    continue;
                }

                self.visit(&path)?;
            }
        }

        self.stack.pop();
        Ok(())
    }
}

fn parse_directive(line: &str) -> Option<(Directive, &str)> {
    let rest = line.trim_start().strip_prefix("//=")?.trim_start();
    let (keyword, target) = rest.split_once(char::is_whitespace)?;

    let directive = match keyword {
        "include" => Directive::Include,
        "require" => Directive::Require,
        _ => return None,
    };

    let target = target.trim().trim_matches(|c| c == '"' || c == '\'');
    if target.is_empty() {
        return None;
    }
    Some((directive, target))
}

/// Expand a directive target into the files it names
fn expand(
    dir: &Path,
    target: &str,
    including: &Path,
    line: usize,
) -> Result<Vec<PathBuf>, TransformError> {
    let mut path = dir.join(target);
    if path.extension().is_none() {
        path.set_extension("js");
    }

    let unresolved = |message: String| TransformError::compile(including, Some(line), message);

    if !target.contains(['*', '?', '[']) {
        if path.is_file() {
            return Ok(vec![path]);
        }
        return Err(unresolved(format!(
            "Cannot resolve include '{}' ({} does not exist)",
            target,
            path.display()
        )));
    }

    let pattern = path.to_string_lossy().into_owned();
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| unresolved(format!("Invalid include pattern '{}': {}", target, e)))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    matches.sort();

    if matches.is_empty() {
        return Err(unresolved(format!(
            "Include pattern '{}' matched no files",
            target
        )));
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::ErrorKind;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, contents: &str) -> PathBuf {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn texts(bundle: &Bundle) -> Vec<&str> {
        bundle.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            parse_directive("//= include ../vendor/jquery.js"),
            Some((Directive::Include, "../vendor/jquery.js"))
        );
        assert_eq!(
            parse_directive("  //=require \"lib/a\""),
            Some((Directive::Require, "lib/a"))
        );
        assert_eq!(parse_directive("// include a.js"), None);
        assert_eq!(parse_directive("//= import a.js"), None);
        assert_eq!(parse_directive("var a = 1; //= include a.js"), None);
    }

    #[test]
    fn test_nested_includes_keep_origin() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "lib/b.js", "var b = 2;");
        write(temp.path(), "lib/a.js", "//= include b\nvar a = 1;");
        let entry = write(
            temp.path(),
            "application.js",
            "// start\n//= include lib/a.js\nrun();",
        );

        let bundle = resolve(&entry).unwrap();

        assert_eq!(texts(&bundle), vec!["// start", "var b = 2;", "var a = 1;", "run();"]);
        assert_eq!(bundle.sources.len(), 3);
        assert_eq!(bundle.lines[1].source, 2);
        assert_eq!(bundle.lines[2].source, 1);
        assert_eq!(bundle.lines[2].line, 1);
        assert_eq!(bundle.lines[3].line, 2);
    }

    #[test]
    fn test_require_once_and_globs() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "components/a.js", "a();");
        write(temp.path(), "components/b.js", "b();");
        let entry = write(
            temp.path(),
            "application.js",
            "//= require components/b\n//= require components/*.js\n//= include components/a",
        );

        let bundle = resolve(&entry).unwrap();
        assert_eq!(texts(&bundle), vec!["b();", "a();", "a();"]);
    }

    #[test]
    fn test_missing_include_is_compile_error() {
        let temp = TempDir::new().unwrap();
        let entry = write(temp.path(), "application.js", "ok();\n//= include nope.js\n");

        let err = resolve(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compile);
        assert_eq!(err.file(), Some(entry.as_path()));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_empty_glob_is_compile_error() {
        let temp = TempDir::new().unwrap();
        let entry = write(temp.path(), "application.js", "//= require widgets/*.js");
        let err = resolve(&entry).unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_include_cycle() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.js", "//= include b.js");
        write(temp.path(), "b.js", "//= include a.js");
        let entry = write(temp.path(), "application.js", "//= include a.js");

        let err = resolve(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compile);
        assert_eq!(err.file(), Some(temp.path().join("b.js").as_path()));
        assert!(err.to_string().starts_with("Include cycle"));
    }

    #[test]
    fn test_missing_entry_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = resolve(&temp.path().join("application.js")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
