//! Year inference from filenames and year bucketing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::file_name;
use crate::sort::{sort_paths, SortMode};

/// Calendar year → files whose name yields that year, ascending by year.
pub type YearBuckets = BTreeMap<u16, Vec<PathBuf>>;

/// Lowest and highest year accepted from a filename.
pub const YEAR_RANGE: std::ops::RangeInclusive<u16> = 1900..=2099;

// Highest priority first. Only the first hit of each rule is considered.
// ASCII digits only; `\d` would also accept other Unicode digits.
static YEAR_RULES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"pubmed_sorted_(?P<year>[0-9]{4})").expect("static regex"),
        Regex::new(r"pubmed_(?P<year>[0-9]{4})").expect("static regex"),
        Regex::new(r"(?P<year>19[0-9]{2}|20[0-9]{2})").expect("static regex"),
    ]
});

/// Infer a four-digit year from a filename.
///
/// Rules are tried in order: `pubmed_sorted_YYYY`, `pubmed_YYYY`, then any
/// `19xx`/`20xx` run of ASCII digits. A rule whose capture is out of range
/// falls through to the next rule.
///
/// ```rust
/// use filesift::extract_year;
///
/// assert_eq!(extract_year("pubmed_sorted_1998_and_2020.xml"), Some(1998));
/// assert_eq!(extract_year("report_2021.csv"), Some(2021));
/// assert_eq!(extract_year("notes.txt"), None);
/// ```
pub fn extract_year(name: &str) -> Option<u16> {
    YEAR_RULES.iter().find_map(|rule| {
        let caps = rule.captures(name)?;
        let year: u16 = caps["year"].parse().ok()?;
        YEAR_RANGE.contains(&year).then_some(year)
    })
}

/// Bucket `files` by the year in their basename.
///
/// Files without a year are dropped. Each bucket is sorted by `mode`.
pub fn group_by_year<I, P>(files: I, mode: SortMode) -> YearBuckets
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut buckets = YearBuckets::new();
    for f in files {
        let path: PathBuf = f.into();
        if let Some(year) = extract_year(&file_name(&path)) {
            buckets.entry(year).or_default().push(path);
        }
    }
    for bucket in buckets.values_mut() {
        sort_paths(bucket, mode, false);
    }
    buckets
}
