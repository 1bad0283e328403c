//! Free-form recursive file search.
//!
//! Unlike [`find_files`](crate::find_files), nothing here sorts or validates
//! the root: a missing root simply yields nothing, and results arrive in
//! whatever order the parallel walker finds them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use regex::{Regex, RegexBuilder};

use crate::engine::{num_cpus, walk_parallel, WalkConfig};
use crate::entry::Entry;
use crate::error::SiftError;
use crate::filter::shell_pattern;
use crate::traits::{AllMatcher, Matcher};

/// A recursive search by basename glob and/or full-path regex.
///
/// ```rust,ignore
/// let hits = FileQuery::new("embeddings/")
///     .pattern("*.h5")
///     .regex(r"emb_\d{4}_")
///     .max_results(50)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct FileQuery {
    root:             PathBuf,
    pattern:          Option<String>,
    regex:            Option<String>,
    case_insensitive: bool,
    max_results:      Option<usize>,
    threads:          usize,
}

impl FileQuery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:             root.into(),
            pattern:          None,
            regex:            None,
            case_insensitive: true,
            max_results:      None,
            threads:          num_cpus(),
        }
    }

    /// Shell glob matched against each file's basename, e.g. `"*2024*.parquet"`.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Regex searched anywhere in each file's full path.
    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    /// Whether the regex ignores case. On by default; the glob is always
    /// case-sensitive.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Stop after `n` results. `0` means no limit.
    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Execute the query. See [`search_files`].
    pub fn run(&self) -> Result<Vec<PathBuf>, SiftError> {
        search_files(self)
    }

    fn matcher(&self) -> Result<Arc<dyn Matcher>, SiftError> {
        let pattern = self
            .pattern
            .as_deref()
            .map(shell_pattern)
            .transpose()?;
        let regex = self
            .regex
            .as_deref()
            .map(|r| {
                RegexBuilder::new(r)
                    .case_insensitive(self.case_insensitive)
                    .build()
                    .map_err(|e| SiftError::InvalidPattern(format!("'{r}': {e}")))
            })
            .transpose()?;

        let matcher: Arc<dyn Matcher> = match (pattern, regex) {
            (None, None) => Arc::new(AllMatcher),
            (pattern, regex) => Arc::new(QueryMatcher { pattern, regex }),
        };
        Ok(matcher)
    }
}

/// Matches basename against a glob and full path against a regex; both must
/// pass when both are set.
struct QueryMatcher {
    pattern: Option<Pattern>,
    regex:   Option<Regex>,
}

impl Matcher for QueryMatcher {
    fn is_match(&self, entry: &Entry) -> bool {
        if let Some(p) = &self.pattern {
            if !p.matches(&entry.name) {
                return false;
            }
        }
        match &self.regex {
            Some(rx) => rx.is_match(&entry.path.to_string_lossy()),
            None => true,
        }
    }
}

/// Recursively search `query.root` for regular files.
///
/// # Errors
///
/// [`SiftError::InvalidPattern`] for a malformed glob or regex. A root that
/// does not exist (or is not a directory) is not an error; the result is
/// empty.
pub fn search_files(query: &FileQuery) -> Result<Vec<PathBuf>, SiftError> {
    let matcher = query.matcher()?;
    let limit = query.max_results.filter(|&n| n > 0);
    Ok(search_files_with(&query.root, matcher, limit, query.threads))
}

/// Recursive parallel search with a caller-supplied [`Matcher`].
pub fn search_files_with(
    root: &Path,
    matcher: Arc<dyn Matcher>,
    limit: Option<usize>,
    threads: usize,
) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "search root missing, nothing to search");
        return Vec::new();
    }

    let config = WalkConfig { threads, max_depth: None, limit };
    let (paths, stats) = walk_parallel(root, &config, matcher);

    tracing::debug!(
        root = %root.display(),
        scanned = stats.files,
        found = paths.len(),
        "search_files"
    );
    paths
}

/// The first file [`search_files`] would return, if any.
pub fn find_one(query: &FileQuery) -> Result<Option<PathBuf>, SiftError> {
    let query = query.clone().max_results(1);
    Ok(search_files(&query)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("emb_2024_a.h5"), "x").unwrap();
        fs::write(root.join("EMB_2023_b.h5"), "x").unwrap();
        fs::write(root.join("notes.md"), "x").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("emb_2022_c.h5"), "x").unwrap();
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        let mut v: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn glob_only_is_recursive() {
        let dir = tree();
        let hits = FileQuery::new(dir.path()).pattern("*.h5").run().unwrap();
        assert_eq!(names(&hits), vec!["EMB_2023_b.h5", "emb_2022_c.h5", "emb_2024_a.h5"]);
    }

    #[test]
    fn regex_is_case_insensitive_by_default() {
        let dir = tree();
        let hits = FileQuery::new(dir.path()).regex(r"emb_\d{4}_").run().unwrap();
        assert_eq!(hits.len(), 3);

        let hits = FileQuery::new(dir.path())
            .regex(r"emb_\d{4}_")
            .case_insensitive(false)
            .run()
            .unwrap();
        assert_eq!(names(&hits), vec!["emb_2022_c.h5", "emb_2024_a.h5"]);
    }

    #[test]
    fn glob_and_regex_must_both_pass() {
        let dir = tree();
        let hits = FileQuery::new(dir.path())
            .pattern("emb_*")
            .regex("nested")
            .run()
            .unwrap();
        assert_eq!(names(&hits), vec!["emb_2022_c.h5"]);
    }

    #[test]
    fn doubled_star_pattern_is_accepted() {
        let dir = tree();
        let hits = FileQuery::new(dir.path()).pattern("emb**.h5").run().unwrap();
        assert_eq!(names(&hits), vec!["emb_2022_c.h5", "emb_2024_a.h5"]);
    }

    #[test]
    fn missing_root_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let hits = FileQuery::new(dir.path().join("nope")).run().unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn bad_regex_is_rejected() {
        let dir = tree();
        let err = FileQuery::new(dir.path()).regex("(").run().unwrap_err();
        assert!(matches!(err, SiftError::InvalidPattern(_)));
    }

    #[test]
    fn find_one_returns_a_single_match() {
        let dir = tree();
        let hit = find_one(&FileQuery::new(dir.path()).pattern("*.h5")).unwrap();
        assert!(hit.unwrap().extension().unwrap() == "h5");

        let none = find_one(&FileQuery::new(dir.path()).pattern("*.csv")).unwrap();
        assert!(none.is_none());
    }
}
