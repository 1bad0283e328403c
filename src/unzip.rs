//! Parallel gunzip of many files at once.
//!
//! A batch is normalized into [`UnzipWorkItem`]s up front (this is where
//! every configuration error surfaces), then fanned out over a bounded
//! worker pool. Each item succeeds or fails on its own; only items that were
//! actually written show up in [`UnzipBatchResult::extracted`].
//!
//! ```rust,ignore
//! let result = filesift::unzip::batch()
//!     .destination("data/xml")
//!     .overwrite(false)
//!     .run_paths(["data/pubmed_0001.xml.gz", "data/pubmed_0002.xml.gz"])?;
//!
//! if result.extracted.len() < 2 {
//!     eprintln!("some files were skipped or failed, see logs");
//! }
//! ```

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use rayon::prelude::*;

use crate::engine::num_cpus;
use crate::error::SiftError;

/// Name of the directory created next to the first source when no
/// destination is given.
pub const DEFAULT_DEST_DIR: &str = "unzipped";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One source archive and where its decompressed bytes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnzipWorkItem {
    pub source:      PathBuf,
    pub destination: PathBuf,
    pub overwrite:   bool,
}

impl UnzipWorkItem {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            source:      source.into(),
            destination: destination.into(),
            overwrite,
        }
    }
}

/// What a batch was asked to decompress.
#[derive(Debug, Clone)]
pub enum UnzipInput {
    /// Bare source paths; destinations are derived from the batch settings.
    Paths(Vec<PathBuf>),
    /// Fully specified work items, used as-is.
    Items(Vec<UnzipWorkItem>),
}

/// The outcome of a batch.
#[derive(Debug, Clone)]
pub struct UnzipBatchResult {
    /// Directory of the first work item's destination.
    pub destination_dir: PathBuf,

    /// Destinations actually written, in no particular order. Skipped and
    /// failed items are absent.
    pub extracted: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// UnzipBatch
// ---------------------------------------------------------------------------

/// Called with `(done, total)` after each item finishes.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Configures and runs a batch. Created via [`batch()`].
#[derive(Clone)]
pub struct UnzipBatch {
    destination: Option<PathBuf>,
    overwrite:   bool,
    threads:     usize,
    progress:    Option<Arc<ProgressFn>>,
}

impl fmt::Debug for UnzipBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnzipBatch")
            .field("destination", &self.destination)
            .field("overwrite", &self.overwrite)
            .field("threads", &self.threads)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Start configuring a decompression batch.
pub fn batch() -> UnzipBatch {
    UnzipBatch {
        destination: None,
        overwrite:   false,
        threads:     num_cpus(),
        progress:    None,
    }
}

impl UnzipBatch {
    /// Shared destination directory for [`UnzipInput::Paths`] batches.
    ///
    /// Defaults to `<parent of first source>/unzipped`. Ignored for
    /// [`UnzipInput::Items`].
    pub fn destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination = Some(dir.into());
        self
    }

    /// Overwrite existing destinations of [`UnzipInput::Paths`] batches.
    /// Off by default.
    pub fn overwrite(mut self, yes: bool) -> Self {
        self.overwrite = yes;
        self
    }

    /// Worker pool size. Defaults to the logical CPU count.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }

    /// Report progress through `f(done, total)`.
    ///
    /// Called once per finished item, whether it was extracted, skipped or
    /// failed, on the worker thread that finished it. `done` reaches `total`
    /// exactly once.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(f));
        self
    }

    pub fn run_paths<I, P>(&self, sources: I) -> Result<UnzipBatchResult, SiftError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.run(UnzipInput::Paths(sources.into_iter().map(Into::into).collect()))
    }

    pub fn run_items(&self, items: Vec<UnzipWorkItem>) -> Result<UnzipBatchResult, SiftError> {
        self.run(UnzipInput::Items(items))
    }

    /// Normalize `input`, then decompress every item on the worker pool.
    ///
    /// # Errors
    ///
    /// Only setup can fail: an empty batch or a source without a file name
    /// ([`SiftError::InvalidInput`]), a destination directory that cannot be
    /// created ([`SiftError::Io`]), or a pool that cannot be started
    /// ([`SiftError::ThreadPool`]). Per-item failures are logged and left
    /// out of the result.
    pub fn run(&self, input: UnzipInput) -> Result<UnzipBatchResult, SiftError> {
        let items = self.plan(input)?;
        let destination_dir = items
            .first()
            .and_then(|i| i.destination.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("unzip-{i}"))
            .build()
            .map_err(|e| SiftError::ThreadPool(e.to_string()))?;

        tracing::info!(items = items.len(), threads = self.threads, "unzipping batch");

        let total = items.len();
        let done = AtomicUsize::new(0);
        let extracted: Vec<PathBuf> = pool.install(|| {
            items
                .par_iter()
                .filter_map(|item| {
                    let written = unzip_one(item);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::debug!(done = n, total, "unzip progress");
                    if let Some(report) = &self.progress {
                        report(n, total);
                    }
                    written
                })
                .collect()
        });

        tracing::info!(
            destination = %destination_dir.display(),
            extracted = extracted.len(),
            not_extracted = items.len() - extracted.len(),
            "batch finished"
        );

        Ok(UnzipBatchResult { destination_dir, extracted })
    }

    /// Turn `input` into the work items [`run()`](Self::run) would process.
    ///
    /// For [`UnzipInput::Paths`] this creates the destination directory.
    pub fn plan(&self, input: UnzipInput) -> Result<Vec<UnzipWorkItem>, SiftError> {
        match input {
            UnzipInput::Items(items) => {
                if items.is_empty() {
                    return Err(SiftError::InvalidInput("no work items given".into()));
                }
                Ok(items)
            }
            UnzipInput::Paths(sources) => {
                let first = sources
                    .first()
                    .ok_or_else(|| SiftError::InvalidInput("no source paths given".into()))?;

                let dest_dir = match &self.destination {
                    Some(d) => d.clone(),
                    None => resolve(first)
                        .parent()
                        .map(|p| p.join(DEFAULT_DEST_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR)),
                };
                fs::create_dir_all(&dest_dir)
                    .map_err(|e| SiftError::Io { path: dest_dir.clone(), source: e })?;
                let dest_dir = resolve(&dest_dir);

                sources
                    .iter()
                    .map(|src| {
                        let stem = src.file_stem().ok_or_else(|| {
                            SiftError::InvalidInput(format!(
                                "source has no file name: {}",
                                src.display()
                            ))
                        })?;
                        Ok(UnzipWorkItem {
                            source:      resolve(src),
                            destination: dest_dir.join(stem),
                            overwrite:   self.overwrite,
                        })
                    })
                    .collect()
            }
        }
    }
}

/// Canonical form of `path` when it exists, otherwise its absolute form.
fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Per-item work
// ---------------------------------------------------------------------------

/// Decompress one item, returning its destination if it was written.
///
/// An existing destination with `overwrite` off is skipped. Any failure is
/// logged with the source path and yields `None`; a half-written destination
/// is removed.
pub fn unzip_one(item: &UnzipWorkItem) -> Option<PathBuf> {
    if item.destination.exists() && !item.overwrite {
        tracing::info!(destination = %item.destination.display(), "skipping, already exists");
        return None;
    }

    match gunzip(&item.source, &item.destination) {
        Ok(bytes) => {
            tracing::info!(
                destination = %item.destination.display(),
                bytes,
                "extracted"
            );
            Some(item.destination.clone())
        }
        Err(e) => {
            tracing::error!(source = %item.source.display(), error = %e, "extraction failed");
            None
        }
    }
}

fn gunzip(source: &Path, destination: &Path) -> io::Result<u64> {
    let input = File::open(source)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut output = BufWriter::new(File::create(destination)?);

    let copied = io::copy(&mut decoder, &mut output).and_then(|n| output.flush().map(|_| n));
    if copied.is_err() {
        drop(output);
        if let Err(e) = fs::remove_file(destination) {
            tracing::debug!(
                destination = %destination.display(),
                error = %e,
                "could not remove partial output"
            );
        }
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_gz(path: &Path, contents: &[u8]) {
        let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        enc.write_all(contents).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn paths_default_to_sibling_unzipped_dir() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pubmed_0001.xml.gz");
        write_gz(&src, b"<xml/>");

        let items = batch().plan(UnzipInput::Paths(vec![src.clone()])).unwrap();
        let expected_dir = fs::canonicalize(dir.path()).unwrap().join(DEFAULT_DEST_DIR);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].destination, expected_dir.join("pubmed_0001.xml"));
        assert!(!items[0].overwrite);
        assert!(expected_dir.is_dir());
    }

    #[test]
    fn explicit_destination_and_overwrite_apply_to_all() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let items = batch()
            .destination(&out)
            .overwrite(true)
            .plan(UnzipInput::Paths(vec![
                dir.path().join("a.txt.gz"),
                dir.path().join("b.gz"),
            ]))
            .unwrap();

        let out = fs::canonicalize(&out).unwrap();
        assert_eq!(items[0].destination, out.join("a.txt"));
        assert_eq!(items[1].destination, out.join("b"));
        assert!(items.iter().all(|i| i.overwrite));
    }

    #[test]
    fn empty_batches_are_rejected() {
        let err = batch().run_paths(Vec::<PathBuf>::new()).unwrap_err();
        assert!(matches!(err, SiftError::InvalidInput(_)));
        let err = batch().run_items(vec![]).unwrap_err();
        assert!(matches!(err, SiftError::InvalidInput(_)));
    }

    #[test]
    fn progress_reports_every_item_once() {
        use std::sync::Mutex;

        let dir = tempfile::tempdir().unwrap();
        let mut sources: Vec<PathBuf> = (0..5)
            .map(|i| {
                let p = dir.path().join(format!("p{i}.gz"));
                write_gz(&p, b"x");
                p
            })
            .collect();
        sources.push(dir.path().join("absent.gz"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let result = batch()
            .destination(dir.path().join("out"))
            .threads(3)
            .on_progress(move |done, total| sink.lock().unwrap().push((done, total)))
            .run_paths(sources)
            .unwrap();

        assert_eq!(result.extracted.len(), 5);
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, (1..=6).map(|n| (n, 6)).collect::<Vec<_>>());
    }

    #[test]
    fn debug_shows_whether_progress_is_set() {
        let text = format!("{:?}", batch().on_progress(|_, _| {}));
        assert!(text.contains("progress: true"));
    }

    #[test]
    fn unzip_one_round_trips_multi_member_streams() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("joined.gz");
        write_gz(&src, b"first ");
        let mut second = Vec::new();
        {
            let mut enc = GzEncoder::new(&mut second, Compression::fast());
            enc.write_all(b"second").unwrap();
            enc.finish().unwrap();
        }
        fs::OpenOptions::new().append(true).open(&src).unwrap().write_all(&second).unwrap();

        let dest = dir.path().join("joined");
        let item = UnzipWorkItem::new(&src, &dest, false);
        assert_eq!(unzip_one(&item), Some(dest.clone()));
        assert_eq!(fs::read(&dest).unwrap(), b"first second");
    }

    #[test]
    fn corrupt_source_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.gz");
        fs::write(&src, b"definitely not gzip").unwrap();
        let dest = dir.path().join("bad");

        assert_eq!(unzip_one(&UnzipWorkItem::new(&src, &dest, true)), None);
        assert!(!dest.exists());
    }

    #[test]
    fn existing_destination_is_skipped_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.gz");
        write_gz(&src, b"new");
        let dest = dir.path().join("a");
        fs::write(&dest, b"old").unwrap();

        assert_eq!(unzip_one(&UnzipWorkItem::new(&src, &dest, false)), None);
        assert_eq!(fs::read(&dest).unwrap(), b"old");

        assert_eq!(unzip_one(&UnzipWorkItem::new(&src, &dest, true)), Some(dest.clone()));
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }
}
