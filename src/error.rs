use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    // Paths
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // Config
    #[error("invalid sort mode '{0}': expected one of 'name', 'mtime', 'size'")]
    InvalidSortMode(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Runtime
    #[error("thread pool failure: {0}")]
    ThreadPool(String),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiftError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p) | Self::NotADirectory(p) | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether this error was raised while validating configuration, before
    /// any filesystem work started.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSortMode(_) | Self::InvalidPattern(_) | Self::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_errors_carry_their_path() {
        let err = SiftError::NotADirectory(PathBuf::from("/tmp/file.txt"));
        assert_eq!(err.path(), Some(&PathBuf::from("/tmp/file.txt")));
        assert!(!err.is_config_error());
        assert_eq!(err.to_string(), "not a directory: /tmp/file.txt");
    }

    #[test]
    fn config_errors_have_no_path() {
        let err = SiftError::InvalidSortMode("bogus".into());
        assert!(err.path().is_none());
        assert!(err.is_config_error());
    }
}
