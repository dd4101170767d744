//! Choosing which directories to subscribe to

use std::path::{Component, Path, PathBuf};

/// The leading components of a glob that contain no wildcard
pub(crate) fn static_prefix(glob: &str) -> PathBuf {
    Path::new(glob)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(['*', '?', '[', '{']))
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Directory to watch for a glob under `root`.
///
/// Falls back to the nearest existing ancestor so rules for directories that
/// appear later are still seen. A concrete file is watched through its parent.
pub(crate) fn watch_root(root: &Path, glob: &str) -> PathBuf {
    let mut dir = root.join(static_prefix(glob));
    if dir.is_file() {
        dir.pop();
    }
    while !dir.is_dir() && dir != root {
        if !dir.pop() {
            return root.to_path_buf();
        }
    }
    dir
}

/// Reduce a set of directories to the minimal set of recursive watch roots.
pub(crate) fn collapse_watch_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<_> = paths.into_iter().collect();
    paths.sort();
    paths.dedup();

    let mut filtered: Vec<PathBuf> = Vec::new();
    for path in paths {
        if filtered.last().is_some_and(|last| path.starts_with(last)) {
            continue;
        }
        filtered.push(path);
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_static_prefix() {
        assert_eq!(static_prefix("app/assets/**/*.js"), PathBuf::from("app/assets"));
        assert_eq!(static_prefix("./src/*.rs"), PathBuf::from("src"));
        assert_eq!(static_prefix("README.md"), PathBuf::from("README.md"));
        assert_eq!(static_prefix("**/*.scss"), PathBuf::new());
    }

    #[test]
    fn test_watch_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("app/assets")).unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        assert_eq!(watch_root(root, "app/assets/**/*.js"), root.join("app/assets"));
        assert_eq!(watch_root(root, "README.md"), root.to_path_buf());
        assert_eq!(watch_root(root, "app/vendor/later/**"), root.join("app"));
        assert_eq!(watch_root(root, "node_modules/x/**"), root.to_path_buf());
    }

    #[test]
    fn test_collapse_watch_paths() {
        let collapsed = collapse_watch_paths([
            PathBuf::from("/a"),
            PathBuf::from("/a/b"),
            PathBuf::from("/a/b/c"),
            PathBuf::from("/b"),
            PathBuf::from("/c/d"),
            PathBuf::from("/b"),
        ]);

        assert_eq!(
            collapsed,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c/d")]
        );
    }

    #[test]
    fn test_collapse_watch_paths_siblings() {
        let collapsed = collapse_watch_paths([PathBuf::from("/a/y"), PathBuf::from("/a/x")]);
        assert_eq!(collapsed, vec![PathBuf::from("/a/x"), PathBuf::from("/a/y")]);
    }

    #[test]
    fn test_collapse_watch_paths_similar_names() {
        // `/foo-bar` is not inside `/foo`
        let collapsed = collapse_watch_paths([PathBuf::from("/foo"), PathBuf::from("/foo-bar")]);
        assert_eq!(collapsed, vec![PathBuf::from("/foo"), PathBuf::from("/foo-bar")]);
    }
}
