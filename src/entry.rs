use std::path::PathBuf;

/// A single filesystem entry produced by the walker.
///
/// Paths are as-walked (not canonical). Canonicalization happens only for
/// entries that survive filtering, so `stat()`/`realpath()` calls are not
/// spent on files that are thrown away anyway.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry, relative to the walk root as given.
    pub path: PathBuf,

    /// The entry's basename.
    pub name: String,

    /// What kind of entry the walker reported.
    pub kind: EntryKind,

    /// How deep in the traversal this entry was found. Root = 0.
    pub depth: usize,
}

impl Entry {
    /// Whether this entry is (or points at) a regular file.
    ///
    /// Symlinks are followed here, so a link to a regular file counts as a
    /// file while a link to a directory does not.
    pub fn is_file(&self) -> bool {
        match self.kind {
            EntryKind::File    => true,
            EntryKind::Symlink => self.path.is_file(),
            _                  => false,
        }
    }
}

/// The kind of a traversed entry, as reported by the walker without
/// following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub(crate) fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }
}
