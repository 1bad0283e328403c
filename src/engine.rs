use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ignore::{DirEntry, WalkBuilder, WalkState};

use crate::entry::{Entry, EntryKind};
use crate::results::ScanStats;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters shared by the sequential and parallel walks.
///
/// `pub(crate)`: callers configure these through
/// [`SearchArgsBuilder`](crate::SearchArgsBuilder) or
/// [`FileQuery`](crate::FileQuery).
pub(crate) struct WalkConfig {
    pub threads:   usize,
    pub max_depth: Option<usize>,
    pub limit:     Option<usize>,
}

impl WalkConfig {
    /// Single-threaded walk of the root's children, or of the whole tree.
    pub fn sequential(recursive: bool) -> Self {
        Self {
            threads:   1,
            max_depth: if recursive { None } else { Some(1) },
            limit:     None,
        }
    }
}

/// Everything visible, nothing ignored, symlinks reported but not followed.
fn walk_builder(root: &Path, config: &WalkConfig) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .threads(config.threads)
        .max_depth(config.max_depth);
    builder
}

/// Build an [`Entry`] for anything below the root.
fn to_entry(entry: &DirEntry) -> Option<Entry> {
    if entry.depth() == 0 {
        return None;
    }
    let ft = entry.file_type()?;
    Some(Entry {
        path:  entry.path().to_path_buf(),
        name:  entry.file_name().to_string_lossy().into_owned(),
        kind:  EntryKind::from_file_type(ft),
        depth: entry.depth(),
    })
}

// ---------------------------------------------------------------------------
// Sequential walk
// ---------------------------------------------------------------------------

/// Walk `root` on the calling thread, returning regular files accepted by
/// `matcher` in walk order.
///
/// Unreadable directories and other traversal errors are logged and
/// skipped.
pub(crate) fn walk_sequential(
    root: &Path,
    config: &WalkConfig,
    matcher: &dyn Matcher,
) -> (Vec<PathBuf>, ScanStats) {
    let start = Instant::now();
    let mut stats = ScanStats::default();
    let mut paths = Vec::new();

    for res in walk_builder(root, config).build() {
        let dent = match res {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let Some(entry) = to_entry(&dent) else {
            continue;
        };

        match entry.kind {
            EntryKind::Dir => stats.dirs += 1,
            _ if entry.is_file() => stats.files += 1,
            _ => continue,
        }

        if entry.is_file() && matcher.is_match(&entry) {
            paths.push(entry.path);
        }
    }

    stats.duration = start.elapsed();
    (paths, stats)
}

// ---------------------------------------------------------------------------
// Parallel walk
// ---------------------------------------------------------------------------

/// Walk `root` across `config.threads` threads, returning regular files
/// accepted by `matcher` in the order they were found.
///
/// With a limit set, the walk stops as soon as that many files matched.
pub(crate) fn walk_parallel(
    root: &Path,
    config: &WalkConfig,
    matcher: Arc<dyn Matcher>,
) -> (Vec<PathBuf>, ScanStats) {
    let walker = walk_builder(root, config).build_parallel();

    // Shared state across threads
    let matches = Arc::new(AtomicUsize::new(0));
    let files   = Arc::new(AtomicUsize::new(0));
    let dirs    = Arc::new(AtomicUsize::new(0));
    let paths   = Arc::new(Mutex::new(Vec::<PathBuf>::new()));

    let start = Instant::now();

    walker.run(|| {
        let matcher = Arc::clone(&matcher);
        let matches = Arc::clone(&matches);
        let files   = Arc::clone(&files);
        let dirs    = Arc::clone(&dirs);
        let paths   = Arc::clone(&paths);
        let limit   = config.limit;

        Box::new(move |res: Result<DirEntry, ignore::Error>| -> WalkState {
            let dent = match res {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    return WalkState::Continue;
                }
            };
            let Some(entry) = to_entry(&dent) else {
                return WalkState::Continue;
            };

            if entry.kind == EntryKind::Dir {
                dirs.fetch_add(1, Ordering::Relaxed);
                return WalkState::Continue;
            }
            if !entry.is_file() {
                return WalkState::Continue;
            }
            files.fetch_add(1, Ordering::Relaxed);

            if !matcher.is_match(&entry) {
                return WalkState::Continue;
            }

            // Two guards: threads can overshoot the limit before Quit
            // propagates, so refuse to collect past it.
            let mc = matches.fetch_add(1, Ordering::Relaxed) + 1;

            if let Some(lim) = limit {
                if mc > lim {
                    return WalkState::Quit;
                }
            }

            if let Ok(mut p) = paths.lock() {
                p.push(entry.path);
            }

            if let Some(lim) = limit {
                if mc >= lim {
                    return WalkState::Quit;
                }
            }

            WalkState::Continue
        })
    });

    let stats = ScanStats {
        files:    files.load(Ordering::Relaxed),
        dirs:     dirs.load(Ordering::Relaxed),
        duration: start.elapsed(),
    };
    let paths = Arc::try_unwrap(paths)
        .map(|m| m.into_inner().unwrap_or_default())
        .unwrap_or_default();

    (paths, stats)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Get the logical CPU count, with a safe fallback.
pub(crate) fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
