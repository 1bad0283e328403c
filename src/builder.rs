use std::path::PathBuf;

use crate::args::SearchArgs;
use crate::discover::find_files;
use crate::error::SiftError;
use crate::filter::{FilterSet, PatternList};
use crate::results::SearchResult;
use crate::sort::SortMode;

// ---------------------------------------------------------------------------
// SearchArgsBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring a discovery run.
///
/// Created via [`filesift::search()`](crate::search). Configure with chained
/// builder methods, then call [`build()`](SearchArgsBuilder::build) for a
/// reusable [`SearchArgs`] or [`run()`](SearchArgsBuilder::run) to discover
/// straight away.
///
/// # Example
///
/// ```rust,ignore
/// let result = filesift::search("data/")
///     .extension("xml")
///     .include("pubmed_*")
///     .recursive(true)
///     .sort_by(SortMode::Size)
///     .max_files(10)
///     .run()?;
/// ```
pub struct SearchArgsBuilder {
    root:      PathBuf,
    prefix:    Option<String>,
    suffix:    Option<String>,
    extension: Option<String>,
    recursive: bool,
    include:   PatternList,
    exclude:   PatternList,
    min_size:  Option<u64>,
    max_files: Option<usize>,
    sort_by:   String,
    reverse:   bool,
}

impl SearchArgsBuilder {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:      root.into(),
            prefix:    None,
            suffix:    None,
            extension: None,
            recursive: false,
            include:   PatternList::default(),
            exclude:   PatternList::default(),
            min_size:  None,
            max_files: None,
            sort_by:   SortMode::default().as_str().to_string(),
            reverse:   false,
        }
    }

    // ── Name filters ──────────────────────────────────────────────────────

    /// Filename must start with `prefix` (case-sensitive).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Filename, minus its final extension, must end with `suffix`.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Required extension, with or without the leading dot. Case-insensitive.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    /// Basename must match at least one of these glob patterns.
    ///
    /// Accepts a single pattern or a list; replaces any earlier value.
    pub fn include(mut self, patterns: impl Into<PatternList>) -> Self {
        self.include = patterns.into();
        self
    }

    /// Basename must match none of these glob patterns.
    pub fn exclude(mut self, patterns: impl Into<PatternList>) -> Self {
        self.exclude = patterns.into();
        self
    }

    /// Keep only files of at least `bytes` bytes.
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.min_size = Some(bytes);
        self
    }

    // ── Traversal & ordering ──────────────────────────────────────────────

    /// Descend into subdirectories. Off by default.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    /// Return at most `n` files, counted after sorting.
    pub fn max_files(mut self, n: usize) -> Self {
        self.max_files = Some(n);
        self
    }

    pub fn sort_by(mut self, mode: SortMode) -> Self {
        self.sort_by = mode.as_str().to_string();
        self
    }

    /// Sort mode given by name (`"name"`, `"mtime"` or `"size"`).
    ///
    /// An unknown name is reported by [`build()`](Self::build).
    pub fn sort_by_str(mut self, mode: impl Into<String>) -> Self {
        self.sort_by = mode.into();
        self
    }

    pub fn reverse(mut self, yes: bool) -> Self {
        self.reverse = yes;
        self
    }

    // ── Finish ────────────────────────────────────────────────────────────

    /// Validate and normalize into an immutable [`SearchArgs`].
    ///
    /// # Errors
    ///
    /// [`SiftError::InvalidSortMode`] for an unknown sort mode and
    /// [`SiftError::InvalidPattern`] for a malformed glob. Nothing touches
    /// the filesystem here.
    pub fn build(self) -> Result<SearchArgs, SiftError> {
        let sort_by: SortMode = self.sort_by.parse()?;

        let extension = self
            .extension
            .map(|e| e.trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty());

        let filters = FilterSet {
            extension,
            prefix:   self.prefix,
            suffix:   self.suffix,
            include:  self.include.compile()?,
            exclude:  self.exclude.compile()?,
            min_size: self.min_size,
        };

        Ok(SearchArgs {
            root: self.root,
            filters,
            recursive: self.recursive,
            max_files: self.max_files,
            sort_by,
            reverse: self.reverse,
        })
    }

    /// Shorthand for `build()` followed by [`find_files`].
    pub fn run(self) -> Result<SearchResult, SiftError> {
        let args = self.build()?;
        find_files(&args)
    }
}
