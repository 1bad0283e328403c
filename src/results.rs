use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::SearchArgs;
use crate::sort::SortMode;
use crate::year::{group_by_year, YearBuckets};

/// The output of a discovery run.
///
/// `year_groups` is computed from `files` when the result is built and only
/// changes through [`regroup()`](SearchResult::regroup).
#[derive(Debug, Clone)]
pub struct SearchResult {
    searched_dir:  PathBuf,
    args:          SearchArgs,
    files:         Vec<PathBuf>,
    total_matched: usize,
    recursive:     bool,
    notes:         Option<String>,
    year_groups:   YearBuckets,
    stats:         ScanStats,
}

impl SearchResult {
    pub(crate) fn new(args: SearchArgs, files: Vec<PathBuf>, stats: ScanStats) -> Self {
        let year_groups = group_by_year(files.iter().cloned(), SortMode::Name);
        Self {
            searched_dir: args.root.clone(),
            recursive: args.recursive,
            total_matched: files.len(),
            args,
            files,
            notes: None,
            year_groups,
            stats,
        }
    }

    /// Attach a free-text note.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The directory that was searched, as given.
    pub fn searched_dir(&self) -> &Path {
        &self.searched_dir
    }

    pub fn args(&self) -> &SearchArgs {
        &self.args
    }

    /// Matched canonical paths, sorted and truncated per the args.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn total_matched(&self) -> usize {
        self.total_matched
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Matched files bucketed by the year in their name.
    pub fn year_groups(&self) -> &YearBuckets {
        &self.year_groups
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Recompute `year_groups` from `files`, ordering each bucket by `mode`.
    pub fn regroup(&mut self, mode: SortMode) -> &YearBuckets {
        self.year_groups = group_by_year(self.files.iter().cloned(), mode);
        &self.year_groups
    }

    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search Directory: {}", self.searched_dir.display())?;
        writeln!(f, "Args: {}", self.args)?;
        writeln!(f, "Files: {:?}", self.files)?;
        writeln!(f, "Total Matched: {}", self.total_matched)?;
        writeln!(f, "Recursive: {}", self.recursive)?;
        write!(f, "Notes: {}", self.notes.as_deref().unwrap_or("-"))
    }
}

/// Walk statistics for a discovery run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    /// Regular files visited (matched or not).
    pub files: usize,

    /// Directories visited, excluding the root.
    pub dirs: usize,

    /// Wall-clock time of the whole [`find_files`](crate::find_files) call,
    /// including canonicalization and sorting. Free-form searches time the
    /// walk only.
    pub duration: Duration,
}
