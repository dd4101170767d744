//! Change events

use std::fmt;
use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;

/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single change, with `path` relative to the watched project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Classify a notify event, pairing each of its paths with a change kind.
///
/// Access and unclassified events yield nothing. A rename reported with both
/// paths becomes a removal of the old path and a creation of the new one.
pub(crate) fn classify(kind: &EventKind, paths: &[PathBuf]) -> Vec<(PathBuf, ChangeKind)> {
    let single = |change: ChangeKind| -> Vec<(PathBuf, ChangeKind)> {
        paths.iter().map(|p| (p.clone(), change)).collect()
    };

    match kind {
        EventKind::Create(_) => single(ChangeKind::Created),
        EventKind::Remove(_) => single(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => single(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => single(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => vec![
            (paths[0].clone(), ChangeKind::Removed),
            (paths[1].clone(), ChangeKind::Created),
        ],
        EventKind::Modify(_) => single(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};

    #[test]
    fn test_classify() {
        let paths = vec![PathBuf::from("/p/a.js")];

        assert_eq!(
            classify(&EventKind::Create(CreateKind::File), &paths),
            vec![(PathBuf::from("/p/a.js"), ChangeKind::Created)]
        );
        assert_eq!(
            classify(
                &EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &paths
            ),
            vec![(PathBuf::from("/p/a.js"), ChangeKind::Modified)]
        );
        assert_eq!(
            classify(&EventKind::Remove(RemoveKind::File), &paths),
            vec![(PathBuf::from("/p/a.js"), ChangeKind::Removed)]
        );
        assert!(classify(&EventKind::Access(AccessKind::Any), &paths).is_empty());
    }

    #[test]
    fn test_classify_rename_both() {
        let paths = vec![PathBuf::from("/p/old.scss"), PathBuf::from("/p/new.scss")];
        assert_eq!(
            classify(
                &EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &paths
            ),
            vec![
                (PathBuf::from("/p/old.scss"), ChangeKind::Removed),
                (PathBuf::from("/p/new.scss"), ChangeKind::Created),
            ]
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ChangeKind::Modified.to_string(), "modified");
    }
}
