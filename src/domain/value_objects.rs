//! Value Objects - Immutable domain primitives
//!
//! Registration-time URL hygiene: which submitted candidates are accepted
//! and how they are reduced to bare base URLs.

/// Hosts that are never accepted as pool members.
pub const BLOCKED_HOSTS: &[&str] = &["api.deeplx.org"];

/// Path suffix stripped from submitted candidates.
pub const TRANSLATE_SUFFIX: &str = "/translate";

/// Reduce a submitted URL to the stored base URL.
///
/// Removes all whitespace, then one trailing `/`, then one trailing
/// `/translate`.
///
/// # Examples
/// ```
/// use translate_pool::domain::value_objects::normalize_candidate;
///
/// assert_eq!(normalize_candidate("https://x.example/translate/ "), "https://x.example");
/// ```
pub fn normalize_candidate(raw: &str) -> String {
    let mut url: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if url.ends_with('/') {
        url.pop();
    }
    if url.ends_with(TRANSLATE_SUFFIX) {
        url.truncate(url.len() - TRANSLATE_SUFFIX.len());
    }
    url
}

/// Decides whether a submitted candidate may be registered.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    ignore_keywords: Vec<String>,
}

impl CandidateFilter {
    pub fn new(ignore_keywords: Vec<String>) -> Self {
        let ignore_keywords = ignore_keywords
            .into_iter()
            .filter(|k| !k.is_empty())
            .collect();
        Self { ignore_keywords }
    }

    /// Check the raw (not yet normalized) candidate.
    pub fn accepts(&self, raw: &str) -> bool {
        if raw.is_empty() || !raw.starts_with("http") {
            return false;
        }
        if BLOCKED_HOSTS.iter().any(|host| raw.contains(host)) {
            return false;
        }
        !self.ignore_keywords.iter().any(|k| raw.contains(k.as_str()))
    }

    /// Filter then normalize a batch of submitted candidates.
    pub fn prepare(&self, raw: &[String]) -> Vec<String> {
        raw.iter()
            .filter(|candidate| self.accepts(candidate))
            .map(|candidate| normalize_candidate(candidate))
            .collect()
    }
}
