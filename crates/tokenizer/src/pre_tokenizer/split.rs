//! Text splitting for pre-tokenization.
//!
//! Pre-tokens never span a split point, so merges never cross word
//! boundaries. Separators are dropped; the splitter is total and empty
//! input yields no pre-tokens.

use regex::Regex;
use shabda_core::{Result, TokenizerError};
use std::sync::OnceLock;

/// Words and runs of punctuation, each as its own pre-token.
pub const WORD_PUNCT_PATTERN: &str = r"\w+|[^\w\s]+";

/// Splitting patterns.
#[derive(Debug, Clone)]
pub enum SplitPattern {
    /// Maximal whitespace runs separate pre-tokens
    Whitespace,
    /// `\w+|[^\w\s]+`: punctuation is split off from words
    WordPunct,
    /// Every regex match is a pre-token
    Custom(Regex),
}

impl PartialEq for SplitPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Whitespace, Self::Whitespace) => true,
            (Self::WordPunct, Self::WordPunct) => true,
            (Self::Custom(a), Self::Custom(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for SplitPattern {}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
}

fn word_punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(WORD_PUNCT_PATTERN).expect("Invalid word/punct regex"))
}

impl Splitter {
    /// Create a new splitter.
    pub fn new(pattern: SplitPattern) -> Self {
        Self { pattern }
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self::new(SplitPattern::Whitespace)
    }

    /// Create a word/punctuation splitter.
    pub fn word_punct() -> Self {
        Self::new(SplitPattern::WordPunct)
    }

    /// Create a splitter whose pre-tokens are the matches of `pattern`.
    pub fn custom(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| {
            TokenizerError::InvalidConfig(format!("invalid split pattern '{}': {}", pattern, e))
        })?;
        Ok(Self::new(SplitPattern::Custom(re)))
    }

    /// The configured pattern.
    pub fn pattern(&self) -> &SplitPattern {
        &self.pattern
    }

    /// Split text into pre-tokens, borrowing from `text`.
    pub fn split_str<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match &self.pattern {
            SplitPattern::Whitespace => text.split_whitespace().collect(),
            SplitPattern::WordPunct => word_punct_regex()
                .find_iter(text)
                .map(|m| m.as_str())
                .collect(),
            SplitPattern::Custom(re) => re
                .find_iter(text)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Split text into owned pre-tokens.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_str(text).into_iter().map(str::to_string).collect()
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        let splitter = Splitter::whitespace();
        let result = splitter.split("मी  मराठी\tबोलतो\n");
        assert_eq!(result, vec!["मी", "मराठी", "बोलतो"]);
    }

    #[test]
    fn test_default_is_whitespace() {
        assert_eq!(Splitter::default(), Splitter::whitespace());
    }

    #[test]
    fn test_word_punct_split() {
        let splitter = Splitter::word_punct();
        let result = splitter.split("नमस्कार, जग!");
        assert_eq!(result, vec!["नमस्कार", ",", "जग", "!"]);
    }

    #[test]
    fn test_custom_split() {
        let splitter = Splitter::custom(r"[a-z]+").unwrap();
        let result = splitter.split("hello, world 42");
        assert_eq!(result, vec!["hello", "world"]);
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let err = Splitter::custom("(unclosed").unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_string() {
        let splitter = Splitter::whitespace();
        assert_eq!(splitter.split(""), Vec::<String>::new());
        assert_eq!(splitter.split("   "), Vec::<String>::new());
        assert!(Splitter::word_punct().split("").is_empty());
    }
}
