//! Search configuration.

use std::path::{Path, PathBuf};

use crate::error::{FileQueryError, Result};

/// Options controlling how the search root is walked.
///
/// The default walks every subdirectory with no exclusions.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Subtrees pruned from the walk.
    pub ignore_directories: Vec<PathBuf>,
    /// Maximum depth; files directly under the root are at depth 1.
    pub max_depth: Option<usize>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory whose whole subtree is skipped.
    pub fn with_ignore_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_directories.push(path.into());
        self
    }

    /// Limits how deep the walk descends.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(FileQueryError::InvalidInput(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if the given path should be skipped.
    pub(crate) fn should_ignore(&self, path: &Path) -> bool {
        self.ignore_directories
            .iter()
            .any(|ignored| path.starts_with(ignored))
    }

    /// Returns true if entries at `depth` are still within the limit.
    pub(crate) fn within_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |limit| depth <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_limits() {
        let options = SearchOptions::default();
        assert!(options.validate().is_ok());
        assert!(options.within_depth(1));
        assert!(options.within_depth(10_000));
        assert!(!options.should_ignore(Path::new("/tmp/anything")));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let error = SearchOptions::new().with_max_depth(0).validate().unwrap_err();
        assert!(matches!(error, FileQueryError::InvalidInput(_)));
    }

    #[test]
    fn depth_limit() {
        let options = SearchOptions::new().with_max_depth(2);
        assert!(options.within_depth(1));
        assert!(options.within_depth(2));
        assert!(!options.within_depth(3));
    }

    #[test]
    fn ignore_matches_components_not_prefixes() {
        let options = SearchOptions::new().with_ignore_directory("/data/build");
        assert!(options.should_ignore(Path::new("/data/build")));
        assert!(options.should_ignore(Path::new("/data/build/out.o")));
        assert!(!options.should_ignore(Path::new("/data/builder")));
    }
}
