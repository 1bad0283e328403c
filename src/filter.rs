//! File predicates and their composition.
//!
//! Each predicate tests one property of a path and knows nothing about the
//! others. [`FilterSet`] ANDs them together in a fixed order, cheapest first,
//! so the metadata read done by the size check only happens for files that
//! already passed the name-based checks.

use std::path::Path;

use glob::Pattern;

use crate::entry::Entry;
use crate::error::SiftError;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// `true` if `required` is absent, otherwise `true` iff the path's final
/// extension equals `required` (case-insensitive).
pub fn extension_matches(path: &Path, required: Option<&str>) -> bool {
    let Some(required) = required else {
        return true;
    };
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase() == required.to_lowercase())
        .unwrap_or(false)
}

/// Case-sensitive prefix check on the full filename, plus a suffix check on
/// the name with its extension removed.
///
/// The suffix passes if either the stem or the filename minus its final
/// extension ends with `suffix`. The two readings can disagree on unusual
/// names (`"a."`, multi-dot names), so both are tried.
pub fn prefix_suffix_matches(path: &Path, prefix: Option<&str>, suffix: Option<&str>) -> bool {
    let name = file_name(path);

    if let Some(prefix) = prefix {
        if !name.starts_with(prefix) {
            return false;
        }
    }

    let Some(suffix) = suffix else {
        return true;
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    // A trailing dot is not an extension: "a.TXT." has stem "a.TXT.".
    let (stem, base_no_ext) = match path.extension().filter(|e| !e.is_empty()) {
        Some(ext) => {
            let dotted = format!(".{}", ext.to_string_lossy());
            let base = name.strip_suffix(dotted.as_str()).unwrap_or(name.as_str()).to_string();
            (stem, base)
        }
        None => (name.clone(), name.clone()),
    };

    stem.ends_with(suffix) || base_no_ext.ends_with(suffix)
}

/// Shell-style include/exclude check against a basename.
///
/// A non-empty `include` requires at least one match; a non-empty `exclude`
/// rejects on any match. Empty lists impose nothing.
pub fn glob_patterns_match(name: &str, include: &[Pattern], exclude: &[Pattern]) -> bool {
    if !include.is_empty() && !include.iter().any(|p| p.matches(name)) {
        return false;
    }
    if exclude.iter().any(|p| p.matches(name)) {
        return false;
    }
    true
}

/// `true` if `min_bytes` is absent, otherwise `true` iff the file is at least
/// `min_bytes` long. A file whose size cannot be read is rejected.
pub fn min_size_matches(path: &Path, min_bytes: Option<u64>) -> bool {
    let Some(min_bytes) = min_bytes else {
        return true;
    };
    match std::fs::metadata(path) {
        Ok(meta) => meta.len() >= min_bytes,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "size unreadable, excluding");
            false
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PatternList
// ---------------------------------------------------------------------------

/// One or more glob patterns as supplied by the caller.
///
/// A single pattern converts into a one-element list, so builder methods can
/// take either `"*.txt"` or `vec!["*.txt", "*.csv"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList(Vec<String>);

impl PatternList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn compile(&self) -> Result<Vec<Pattern>, SiftError> {
        self.0
            .iter()
            .map(|p| shell_pattern(p))
            .collect()
    }
}

/// Compile a shell-style basename pattern.
///
/// `glob` is path-aware where `fnmatch` is not, so the pattern is rewritten
/// first: runs of `*` collapse to one `*`, and a `[` with no closing `]`
/// becomes a literal `[`.
pub(crate) fn shell_pattern(raw: &str) -> Result<Pattern, SiftError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }

    Pattern::new(&out).map_err(|e| SiftError::InvalidPattern(format!("'{raw}': {e}")))
}

/// Index of the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

impl From<&str> for PatternList {
    fn from(p: &str) -> Self {
        Self(vec![p.to_string()])
    }
}

impl From<String> for PatternList {
    fn from(p: String) -> Self {
        Self(vec![p])
    }
}

impl From<Vec<String>> for PatternList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<Vec<&str>> for PatternList {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PatternList {
    fn from(v: &[&str]) -> Self {
        Self(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PatternList {
    fn from(v: [&str; N]) -> Self {
        Self(v.iter().map(|s| s.to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// Every filter of a discovery run, validated and ready to apply.
///
/// Built by [`SearchArgsBuilder`](crate::SearchArgsBuilder); exposed so the
/// same decision can be re-applied to paths outside a discovery call.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub(crate) extension: Option<String>,
    pub(crate) prefix:    Option<String>,
    pub(crate) suffix:    Option<String>,
    pub(crate) include:   Vec<Pattern>,
    pub(crate) exclude:   Vec<Pattern>,
    pub(crate) min_size:  Option<u64>,
}

impl FilterSet {
    /// AND of every predicate, in order: extension, prefix/suffix, glob
    /// patterns, minimum size.
    pub fn file_passes(&self, path: &Path) -> bool {
        extension_matches(path, self.extension.as_deref())
            && prefix_suffix_matches(path, self.prefix.as_deref(), self.suffix.as_deref())
            && glob_patterns_match(&file_name(path), &self.include, &self.exclude)
            && min_size_matches(path, self.min_size)
    }
}

impl Matcher for FilterSet {
    fn is_match(&self, entry: &Entry) -> bool {
        self.file_passes(&entry.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn patterns(ps: &[&str]) -> Vec<Pattern> {
        PatternList::from(ps).compile().unwrap()
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(extension_matches(Path::new("data/A.TXT"), Some("txt")));
        assert!(extension_matches(Path::new("a.txt"), Some("TXT")));
        assert!(!extension_matches(Path::new("a.csv"), Some("txt")));
        assert!(!extension_matches(Path::new("txt"), Some("txt")));
        assert!(extension_matches(Path::new("anything"), None));
    }

    #[test]
    fn extension_only_checks_the_final_one() {
        assert!(extension_matches(Path::new("pubmed.xml.gz"), Some("gz")));
        assert!(!extension_matches(Path::new("pubmed.xml.gz"), Some("xml")));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert!(prefix_suffix_matches(Path::new("pubmed_2020.xml"), Some("pubmed"), None));
        assert!(!prefix_suffix_matches(Path::new("Pubmed_2020.xml"), Some("pubmed"), None));
    }

    #[test]
    fn suffix_ignores_final_extension() {
        assert!(prefix_suffix_matches(Path::new("report_final.csv"), None, Some("_final")));
        assert!(!prefix_suffix_matches(Path::new("report_final.csv"), None, Some(".csv")));
        assert!(prefix_suffix_matches(Path::new("archive.tar.gz"), None, Some(".tar")));
        assert!(prefix_suffix_matches(Path::new("noext_v2"), None, Some("_v2")));
    }

    #[test]
    fn trailing_dot_is_not_an_extension() {
        let p = Path::new("a.TXT.");
        assert!(prefix_suffix_matches(p, None, Some("TXT.")));
        assert!(!prefix_suffix_matches(p, None, Some("TXT")));
    }

    #[test]
    fn prefix_and_suffix_both_required() {
        let p = Path::new("emb_2024_final.h5");
        assert!(prefix_suffix_matches(p, Some("emb_"), Some("final")));
        assert!(!prefix_suffix_matches(p, Some("emb_"), Some("draft")));
        assert!(!prefix_suffix_matches(p, Some("vec_"), Some("final")));
    }

    #[test]
    fn include_and_exclude_combine() {
        let inc = patterns(&["*.txt", "*.csv"]);
        let exc = patterns(&["tmp_*"]);
        assert!(glob_patterns_match("a.txt", &inc, &exc));
        assert!(glob_patterns_match("b.csv", &inc, &exc));
        assert!(!glob_patterns_match("c.md", &inc, &exc));
        assert!(!glob_patterns_match("tmp_a.txt", &inc, &exc));
        assert!(glob_patterns_match("whatever", &[], &[]));
    }

    #[test]
    fn globs_are_case_sensitive_and_support_classes() {
        let inc = patterns(&["data_[0-9]?.bin"]);
        assert!(glob_patterns_match("data_1a.bin", &inc, &[]));
        assert!(!glob_patterns_match("DATA_1a.bin", &inc, &[]));
        assert!(!glob_patterns_match("data_xa.bin", &inc, &[]));
    }

    #[test]
    fn repeated_stars_act_as_one() {
        let inc = patterns(&["pubmed**"]);
        assert!(glob_patterns_match("pubmed_2020.xml", &inc, &[]));
        assert!(!glob_patterns_match("other_2020.xml", &inc, &[]));

        let inc = patterns(&["a***b.txt"]);
        assert!(glob_patterns_match("a_x_b.txt", &inc, &[]));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let exc = patterns(&["[old"]);
        assert!(!glob_patterns_match("[old", &[], &exc));
        assert!(glob_patterns_match("old", &[], &exc));
        assert!(glob_patterns_match("o", &[], &exc));

        let inc = patterns(&["x[*"]);
        assert!(glob_patterns_match("x[1].csv", &inc, &[]));
        assert!(!glob_patterns_match("x1.csv", &inc, &[]));
    }

    #[test]
    fn bracket_right_after_open_is_a_member() {
        let inc = patterns(&["[]a]*", "[!]x]z"]);
        assert!(glob_patterns_match("]file", &inc, &[]));
        assert!(glob_patterns_match("afile", &inc, &[]));
        assert!(glob_patterns_match("yz", &inc, &[]));
        assert!(!glob_patterns_match("]z", &inc, &[]));
    }

    #[test]
    fn single_pattern_becomes_one_element_list() {
        assert_eq!(PatternList::from("*.txt").as_slice(), &["*.txt".to_string()]);
    }

    #[test]
    fn min_size_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.bin");
        let big = dir.path().join("big.bin");
        fs::write(&small, vec![0u8; 10]).unwrap();
        fs::write(&big, vec![0u8; 100]).unwrap();

        assert!(!min_size_matches(&small, Some(50)));
        assert!(min_size_matches(&big, Some(50)));
        assert!(min_size_matches(&big, Some(100)));
        assert!(min_size_matches(&small, None));
    }

    #[test]
    fn min_size_rejects_vanished_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!min_size_matches(&dir.path().join("gone.bin"), Some(0)));
    }
}
