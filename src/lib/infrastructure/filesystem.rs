//! Build source directory

use std::path::{Path, PathBuf};

/// The directory the step was pointed at; relative paths resolve against it
/// and rendered templates are written into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot(PathBuf);

impl SourceRoot {
    /// Create a new source root
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolves `path` against the root unless it is already absolute
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.0.join(path)
        }
    }

    /// The location of a build artifact written by this step
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let root = SourceRoot::new("/tmp/build");

        assert_eq!(
            root.resolve("templates/subject.txt"),
            PathBuf::from("/tmp/build/templates/subject.txt")
        );
    }

    #[test]
    fn test_absolute_paths_are_used_as_is() {
        let root = SourceRoot::new("/tmp/build");

        assert_eq!(root.resolve("/etc/subject.txt"), PathBuf::from("/etc/subject.txt"));
    }

    #[test]
    fn test_artifacts_live_in_root() {
        let root = SourceRoot::new("/tmp/build");

        assert_eq!(
            root.artifact("subject_template.txt"),
            PathBuf::from("/tmp/build/subject_template.txt")
        );
    }
}
