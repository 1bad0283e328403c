use crate::entry::Entry;

/// Determines whether a walked entry is kept.
///
/// The discovery engine composes its filters into a single [`Matcher`]
/// ([`FilterSet`](crate::FilterSet)); free-form searches use a pattern/regex
/// matcher. Implement it yourself to plug custom logic into
/// [`search_files_with`](crate::locate::search_files_with).
///
/// # Thread Safety
///
/// `Send + Sync` are required: matchers are shared across walker threads and
/// called concurrently on different entries.
///
/// # Example
///
/// ```rust
/// use filesift::{Matcher, Entry};
///
/// struct ExtensionMatcher(String);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, entry: &Entry) -> bool {
///         entry.path
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(&self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this entry should be included in results.
    fn is_match(&self, entry: &Entry) -> bool;
}

/// Matches every entry.
pub(crate) struct AllMatcher;

impl Matcher for AllMatcher {
    fn is_match(&self, _entry: &Entry) -> bool {
        true
    }
}
