//! Candidate file selection
//!
//! All checks take paths relative to the scan root, so the location of the
//! staging directory itself never influences what gets excluded.

use crate::scanner::error::{ScanError, ScanResult};
use glob::Pattern;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// Decides which files in a checkout are worth parsing
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    source_suffix: String,
    test_suffix: String,
    vendor_dir: String,
    excludes: Vec<Pattern>,
}

impl CandidateFilter {
    /// Go sources, excluding tests and vendored dependencies
    pub fn go() -> Self {
        Self {
            source_suffix: ".go".to_string(),
            test_suffix: "_test.go".to_string(),
            vendor_dir: "vendor".to_string(),
            excludes: Vec::new(),
        }
    }

    /// Add glob patterns; matching files are skipped and matching directories pruned
    pub fn with_excludes(mut self, patterns: &[String]) -> ScanResult<Self> {
        for pattern in patterns {
            let compiled = Pattern::new(pattern).map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            self.excludes.push(compiled);
        }
        Ok(self)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.excludes.iter().any(|p| p.matches_path(relative))
    }

    fn in_vendor_tree(&self, relative: &Path) -> bool {
        relative
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == OsStr::new(&self.vendor_dir)))
    }

    /// Whether the walk should skip a directory entirely
    pub fn is_pruned_dir(&self, relative: &Path) -> bool {
        self.in_vendor_tree(relative) || self.is_excluded(relative)
    }

    /// Whether a (non-directory) entry should be parsed
    pub fn is_candidate(&self, relative: &Path) -> bool {
        let Some(name) = relative.file_name().and_then(OsStr::to_str) else {
            return false;
        };

        !name.ends_with(&self.test_suffix)
            && name.ends_with(&self.source_suffix)
            && !self.in_vendor_tree(relative)
            && !self.is_excluded(relative)
    }
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::go()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_sources_are_candidates() {
        let filter = CandidateFilter::go();
        assert!(filter.is_candidate(Path::new("main.go")));
        assert!(filter.is_candidate(Path::new("internal/server/router.go")));
    }

    #[test]
    fn test_tests_and_other_suffixes_rejected() {
        let filter = CandidateFilter::go();
        assert!(!filter.is_candidate(Path::new("router_test.go")));
        assert!(!filter.is_candidate(Path::new("README.md")));
        assert!(!filter.is_candidate(Path::new("go.mod")));
        assert!(!filter.is_candidate(Path::new("main.go.orig")));
    }

    #[test]
    fn test_vendor_tree_rejected() {
        let filter = CandidateFilter::go();
        assert!(!filter.is_candidate(Path::new("vendor/github.com/pkg/errors/errors.go")));
        assert!(filter.is_pruned_dir(Path::new("vendor")));
        assert!(filter.is_pruned_dir(Path::new("tools/vendor")));
        // Only an exact component counts
        assert!(filter.is_candidate(Path::new("vendored/lib.go")));
    }

    #[test]
    fn test_exclude_globs() {
        let filter = CandidateFilter::go()
            .with_excludes(&["testdata/**".to_string(), "*.pb.go".to_string()])
            .unwrap();

        assert!(!filter.is_candidate(Path::new("testdata/fixture.go")));
        assert!(!filter.is_candidate(Path::new("api.pb.go")));
        assert!(filter.is_candidate(Path::new("api.go")));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let result = CandidateFilter::go().with_excludes(&["[unclosed".to_string()]);
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }
}
