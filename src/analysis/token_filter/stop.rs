//! Stop filter implementation.
//!
//! This module provides a filter that removes common words (stop words) that
//! carry little sentiment on their own. The default list is the English list
//! shipped with NLTK; individual words can be exempted so that, for example,
//! negations survive.
//!
//! # Examples
//!
//! ```
//! use tastebud::analysis::token_filter::Filter;
//! use tastebud::analysis::token_filter::stop::StopFilter;
//! use tastebud::analysis::token::Token;
//!
//! let filter = StopFilter::new().with_exemptions(["not"]);
//! let tokens = vec![
//!     Token::new("was", 0),
//!     Token::new("not", 1),
//!     Token::new("good", 2)
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "not");
//! assert_eq!(result[1].text, "good");
//! ```

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list (NLTK `stopwords.words("english")`).
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// ```
/// use tastebud::analysis::token_filter::stop::StopFilter;
///
/// let filter = StopFilter::from_words(vec!["custom", "words", "list"]);
/// assert_eq!(filter.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<HashSet<String>>,
    /// Words kept even though the base list contains them
    exemptions: BTreeSet<String>,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    ///
    /// ```
    /// use tastebud::analysis::token_filter::stop::StopFilter;
    ///
    /// let filter = StopFilter::new();
    /// assert_eq!(filter.len(), 179);
    /// assert!(filter.is_stop_word("the"));
    /// assert!(!filter.is_stop_word("delicious"));
    /// ```
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            exemptions: BTreeSet::new(),
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Exempt words from removal even if the stop list contains them.
    pub fn with_exemptions<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exemptions.extend(words.into_iter().map(Into::into));
        self
    }

    /// Check if a word is a stop word, taking exemptions into account.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word) && !self.exemptions.contains(word)
    }

    /// The base stop words in sorted order, exemptions not applied.
    pub fn sorted_stop_words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.stop_words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// The exempted words in sorted order.
    pub fn exemptions(&self) -> impl Iterator<Item = &str> {
        self.exemptions.iter().map(String::as_str)
    }

    /// Get the number of stop words in the base list.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let kept: Vec<Token> = tokens
            .filter(|token| !self.is_stop_word(&token.text))
            .collect();
        Ok(Box::new(kept.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn run(filter: &StopFilter, words: &[&str]) -> Vec<Token> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter.filter(Box::new(tokens.into_iter())).unwrap().collect()
    }

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::from_words(vec!["the", "and", "or"]);
        let result = run(&filter, &["hello", "the", "world", "and", "test"]);

        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world", "test"]);
        // positions are not renumbered
        assert_eq!(result[1].position, 2);
    }

    #[test]
    fn test_default_list() {
        let filter = StopFilter::new();
        assert_eq!(filter.len(), 179);
        for word in ["i", "you're", "wouldn't", "not", "very", "y"] {
            assert!(filter.is_stop_word(word), "{word} should be a stop word");
        }
        assert!(!filter.is_stop_word("good"));
    }

    #[test]
    fn test_exemption() {
        let filter = StopFilter::new().with_exemptions(["not"]);
        assert!(!filter.is_stop_word("not"));
        assert!(filter.is_stop_word("no"));
        assert_eq!(filter.len(), 179);
        assert_eq!(filter.exemptions().collect::<Vec<_>>(), vec!["not"]);

        let result = run(&filter, &["the", "food", "was", "not", "good"]);
        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["food", "not", "good"]);
    }

    #[test]
    fn test_sorted_stop_words() {
        let filter = StopFilter::from_words(vec!["b", "c", "a"]);
        assert_eq!(filter.sorted_stop_words(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(StopFilter::new().name(), "stop");
    }
}
