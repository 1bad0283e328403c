//! Sort modes and error-tolerant sort keys.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use crate::error::SiftError;
use crate::filter::file_name;

/// How matched files are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Basename, case-sensitive, code-point order.
    #[default]
    Name,
    /// Last modification time.
    Mtime,
    /// Size in bytes.
    Size,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Name  => "name",
            SortMode::Mtime => "mtime",
            SortMode::Size  => "size",
        }
    }
}

impl FromStr for SortMode {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name"  => Ok(SortMode::Name),
            "mtime" => Ok(SortMode::Mtime),
            "size"  => Ok(SortMode::Size),
            other   => Err(SiftError::InvalidSortMode(other.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// A comparable key extracted from one path.
///
/// `Unreadable` stands for metadata that could not be read. It compares
/// greater than every other key and stays at the end of a sorted list even
/// when the order is reversed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Name(String),
    Modified(SystemTime),
    Size(u64),
    Unreadable,
}

impl SortKey {
    pub fn is_unreadable(&self) -> bool {
        matches!(self, SortKey::Unreadable)
    }

    /// Compare two keys for a sort in the given direction.
    ///
    /// Direction only applies between readable keys; unreadable ones always
    /// compare as last.
    pub fn compare(&self, other: &SortKey, reverse: bool) -> Ordering {
        match (self.is_unreadable(), other.is_unreadable()) {
            (true, true)   => Ordering::Equal,
            (true, false)  => Ordering::Greater,
            (false, true)  => Ordering::Less,
            (false, false) if reverse => other.cmp(self),
            (false, false) => self.cmp(other),
        }
    }
}

/// Key-extraction function for `mode`.
pub fn sort_key_for(mode: SortMode) -> fn(&Path) -> SortKey {
    match mode {
        SortMode::Name  => name_key,
        SortMode::Mtime => mtime_key,
        SortMode::Size  => size_key,
    }
}

fn name_key(path: &Path) -> SortKey {
    SortKey::Name(file_name(path))
}

fn mtime_key(path: &Path) -> SortKey {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t)  => SortKey::Modified(t),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "mtime unreadable, sorting last");
            SortKey::Unreadable
        }
    }
}

fn size_key(path: &Path) -> SortKey {
    match std::fs::metadata(path) {
        Ok(m)  => SortKey::Size(m.len()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "size unreadable, sorting last");
            SortKey::Unreadable
        }
    }
}

/// Stable in-place sort of `paths` by `mode`.
///
/// Each key is extracted once. Entries with unreadable metadata end up last
/// in their original relative order, whatever `reverse` says.
pub fn sort_paths(paths: &mut Vec<PathBuf>, mode: SortMode, reverse: bool) {
    let key_fn = sort_key_for(mode);
    let mut keyed: Vec<(SortKey, PathBuf)> = paths.drain(..).map(|p| (key_fn(&p), p)).collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, reverse));
    paths.extend(keyed.into_iter().map(|(_, p)| p));
}
