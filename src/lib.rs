//! # filesift
//!
//! Directory scanning and file classification.
//!
//! filesift finds the files under a directory that pass a composable set of
//! filters (extension, prefix/suffix, glob include/exclude, minimum size),
//! sorts them by name, modification time or size, caps the count, and
//! buckets the survivors by the calendar year found in their names. A
//! companion [`unzip`] module decompresses batches of gzip files on a worker
//! pool.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use filesift::SortMode;
//!
//! let result = filesift::search("data/pubmed")
//!     .extension("xml")
//!     .prefix("pubmed_")
//!     .min_size(1024)
//!     .sort_by(SortMode::Size)
//!     .reverse(true)
//!     .run()?;
//!
//! for (year, files) in result.year_groups() {
//!     println!("{year}: {} files", files.len());
//! }
//! # Ok::<(), filesift::SiftError>(())
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted through [`tracing`]. filesift never installs a
//! subscriber; install one in your binary to see them.
//!
//! # Errors
//!
//! Only configuration problems (unknown sort mode, malformed glob or regex,
//! empty batch) and a bad search root are errors. Unreadable files are
//! excluded or sorted last; failed decompressions are logged and skipped.

#![forbid(unsafe_code)]

pub mod locate;
pub mod unzip;

mod args;
mod builder;
mod discover;
mod engine;
mod entry;
mod error;
mod filter;
mod results;
mod sort;
mod traits;
mod year;

use std::path::PathBuf;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use args::SearchArgs;
pub use builder::SearchArgsBuilder;
pub use discover::find_files;
pub use entry::{Entry, EntryKind};
pub use error::SiftError;
pub use filter::{
    extension_matches, glob_patterns_match, min_size_matches, prefix_suffix_matches, FilterSet,
    PatternList,
};
pub use locate::{find_one, search_files, FileQuery};
pub use results::{ScanStats, SearchResult};
pub use sort::{sort_key_for, sort_paths, SortKey, SortMode};
pub use traits::Matcher;
pub use unzip::{ProgressFn, UnzipBatch, UnzipBatchResult, UnzipInput, UnzipWorkItem};
pub use year::{extract_year, group_by_year, YearBuckets, YEAR_RANGE};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchArgsBuilder`] rooted at `root`.
///
/// # Example
///
/// ```rust
/// let args = filesift::search("/var/data")
///     .extension(".parquet")
///     .include(["part-*", "chunk-*"])
///     .build()
///     .unwrap();
///
/// assert_eq!(args.extension(), Some("parquet"));
/// assert_eq!(args.include_patterns(), vec!["part-*", "chunk-*"]);
/// ```
pub fn search(root: impl Into<PathBuf>) -> SearchArgsBuilder {
    SearchArgsBuilder::new(root)
}
