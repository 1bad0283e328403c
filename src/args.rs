use std::fmt;
use std::path::{Path, PathBuf};

use crate::filter::FilterSet;
use crate::sort::SortMode;

/// Validated, immutable configuration for one discovery run.
///
/// Only constructible through [`SearchArgsBuilder`](crate::SearchArgsBuilder),
/// so every `SearchArgs` in existence has a known sort mode, compiled glob
/// patterns and a dot-free extension.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub(crate) root:      PathBuf,
    pub(crate) filters:   FilterSet,
    pub(crate) recursive: bool,
    pub(crate) max_files: Option<usize>,
    pub(crate) sort_by:   SortMode,
    pub(crate) reverse:   bool,
}

impl SearchArgs {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> Option<&str> {
        self.filters.prefix.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.filters.suffix.as_deref()
    }

    /// Required extension, without a leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.filters.extension.as_deref()
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Include globs as compiled. A stray `[` shows up escaped as `[[]` and
    /// a run of `*` as a single `*`.
    pub fn include_patterns(&self) -> Vec<&str> {
        self.filters.include.iter().map(|p| p.as_str()).collect()
    }

    pub fn exclude_patterns(&self) -> Vec<&str> {
        self.filters.exclude.iter().map(|p| p.as_str()).collect()
    }

    pub fn min_size_bytes(&self) -> Option<u64> {
        self.filters.min_size
    }

    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    pub fn sort_by(&self) -> SortMode {
        self.sort_by
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// The combined filter this run applies to each candidate.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }
}

impl fmt::Display for SearchArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root={} prefix={:?} suffix={:?} extension={:?} recursive={} include={:?} \
             exclude={:?} min_size_bytes={:?} max_files={:?} sort_by={} reverse={}",
            self.root.display(),
            self.prefix(),
            self.suffix(),
            self.extension(),
            self.recursive,
            self.include_patterns(),
            self.exclude_patterns(),
            self.min_size_bytes(),
            self.max_files,
            self.sort_by,
            self.reverse,
        )
    }
}
