//! Pulling structured hints out of free-text task results.
//!
//! [`Extractor`] is the seam between unstructured agent output and the
//! workflow's follow-up steps. The default [`HeuristicEmailExtractor`] is a
//! deliberately small heuristic, not an address-grammar parser:
//!
//! - a token qualifies if, after trimming punctuation, it has exactly one `@`
//!   and a `.` somewhere after it;
//! - a trailing dot is stripped with the punctuation, so `me@example.com.` yields
//!   `me@example.com`, but `me@example.` is rejected;
//! - quoted local parts, comments, and IP-literal domains are not understood;
//! - only the first qualifying token is reported.

use crate::types::ExtractedInfo;

/// Characters trimmed from both ends of a token before it is checked.
const TRIM_CHARS: &[char] = &[',', '.', '!', '?', '(', ')', '[', ']', '{', '}', '\'', '"', '\n'];

/// Derives key/value hints from a task result's text.
pub trait Extractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedInfo;
}

/// Finds the first email-address-looking token. See the module docs for its limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEmailExtractor;

impl HeuristicEmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HeuristicEmailExtractor {
    fn extract(&self, text: &str) -> ExtractedInfo {
        let mut info = ExtractedInfo::new();
        if let Some(address) = first_email_address(text) {
            info.insert(ExtractedInfo::EMAIL_ADDRESS, address);
        }
        info
    }
}

/// First whitespace-separated token that passes the address heuristic.
pub fn first_email_address(text: &str) -> Option<&str> {
    text.split_whitespace()
        .filter(|token| token.contains('@'))
        .map(|token| token.trim_matches(TRIM_CHARS))
        .find(|candidate| looks_like_address(candidate))
}

fn looks_like_address(candidate: &str) -> bool {
    let mut parts = candidate.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(domain), None) => domain.contains('.'),
        _ => false,
    }
}

/// Closures work as extractors, which keeps tests and one-off strategies short.
impl<F> Extractor for F
where
    F: Fn(&str) -> ExtractedInfo + Send + Sync,
{
    fn extract(&self, text: &str) -> ExtractedInfo {
        self(text)
    }
}
