use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use crate::args::SearchArgs;
use crate::engine::{walk_sequential, WalkConfig};
use crate::error::SiftError;
use crate::results::SearchResult;
use crate::sort::sort_paths;

/// Discover the files under `args.root` that pass every filter.
///
/// Candidates are walked on the calling thread, filtered, canonicalized,
/// sorted, then truncated to `max_files`. A candidate that disappears before
/// it can be canonicalized is dropped.
///
/// # Errors
///
/// [`SiftError::NotFound`] if the root does not exist and
/// [`SiftError::NotADirectory`] if it is not a directory. Per-file problems
/// never fail the call.
pub fn find_files(args: &SearchArgs) -> Result<SearchResult, SiftError> {
    let start = Instant::now();
    let root = &args.root;

    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SiftError::NotFound(root.clone()),
        _ => SiftError::Io { path: root.clone(), source: e },
    })?;
    if !meta.is_dir() {
        return Err(SiftError::NotADirectory(root.clone()));
    }

    let config = WalkConfig::sequential(args.recursive);
    let (candidates, mut stats) = walk_sequential(root, &config, &args.filters);

    let mut files: Vec<PathBuf> = candidates
        .into_iter()
        .filter_map(|p| match fs::canonicalize(&p) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!(path = %p.display(), error = %e, "cannot canonicalize, dropping");
                None
            }
        })
        .collect();

    sort_paths(&mut files, args.sort_by, args.reverse);

    if let Some(max) = args.max_files {
        files.truncate(max);
    }
    stats.duration = start.elapsed();

    tracing::debug!(
        root = %root.display(),
        recursive = args.recursive,
        total_matched = files.len(),
        "find_files"
    );

    Ok(SearchResult::new(args.clone(), files, stats))
}
