//! Filesystem helpers shared by the transforms

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use gantry_core::TransformError;

/// Write `contents` to a temporary sibling of `path` and rename it into place
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), TransformError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| TransformError::write(parent, e))?;

    let mut temp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| TransformError::write(path, e))?;
    temp.write_all(contents)
        .map_err(|e| TransformError::write(path, e))?;
    temp.persist(path)
        .map_err(|e| TransformError::write(path, e.error))?;
    Ok(())
}

/// Path of `target` relative to the directory `base`, using `/` separators.
///
/// Both paths are made absolute first; if they share no common prefix the
/// absolute target is returned.
pub(crate) fn relative_url(base: &Path, target: &Path) -> String {
    let base = absolute(base);
    let target = absolute(target);

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to_url(&target);
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..".to_string());
    }
    for part in &target_parts[common..] {
        parts.push(part.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    // Lexical normalisation; the paths may not exist yet
    let mut normal = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other.as_os_str()),
        }
    }
    normal
}

fn to_url(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("a/b/out.css");

        write_atomic(&path, b"body{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body{}");

        write_atomic(&path, b"p{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "p{}");
        assert_eq!(fs::read_dir(temp.path().join("a/b")).unwrap().count(), 1);
    }

    #[test]
    fn test_relative_url() {
        assert_eq!(
            relative_url(
                Path::new("/p/app/static/javascripts/maps"),
                Path::new("/p/app/assets/javascripts/application.js")
            ),
            "../../../assets/javascripts/application.js"
        );
        assert_eq!(
            relative_url(Path::new("/p/out"), Path::new("/p/out/x.scss")),
            "x.scss"
        );
        assert_eq!(
            relative_url(Path::new("/p/./out/../css"), Path::new("/p/scss/a.scss")),
            "../scss/a.scss"
        );
    }
}
