//! Content filtering seam.
//!
//! The router treats the filter as an opaque predicate over message text;
//! the stock implementation is a case-insensitive word-list match.

/// Predicate applied to message text before it is relayed.
pub trait MessageFilter: Send + Sync {
    /// Returns true when `text` must not be relayed.
    fn is_profane(&self, text: &str) -> bool;
}

/// Stock denied words.
const DEFAULT_DENY_WORDS: &[&str] = &["damn", "hell", "crap", "bastard"];

/// Word-list filter matching whole words, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WordListFilter {
    words: Vec<String>,
}

impl WordListFilter {
    /// Build a filter from denied words.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        filter.extend(words);
        filter
    }

    /// Filter seeded with the stock denied words.
    pub fn with_default_words() -> Self {
        Self::new(DEFAULT_DENY_WORDS.iter().copied())
    }

    /// Add denied words; empty entries are ignored.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.into().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
    }
}

impl MessageFilter for WordListFilter {
    fn is_profane(&self, text: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .any(|token| self.words.iter().any(|deny| deny == token))
    }
}
