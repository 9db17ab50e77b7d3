//! Analyzer assembled from char filters, a tokenizer and token filters.
//!
//! Stages run in a fixed order: every char filter over the raw text, then
//! the tokenizer, then the token filters in the order they were added.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tastebud::analysis::analyzer::Analyzer;
//! use tastebud::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use tastebud::analysis::token_filter::lowercase::LowercaseFilter;
//! use tastebud::analysis::token_filter::stop::StopFilter;
//! use tastebud::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let analyzer = PipelineAnalyzer::new("menu", Arc::new(WhitespaceTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])));
//!
//! let words: Vec<String> = analyzer
//!     .analyze("Soup AND the Salad")
//!     .unwrap()
//!     .map(|token| token.text)
//!     .collect();
//! assert_eq!(words, vec!["soup", "salad"]);
//! assert_eq!(analyzer.describe(), "whitespace|lowercase,stop");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

#[derive(Clone)]
pub struct PipelineAnalyzer {
    name: String,
    char_filters: Vec<Arc<dyn CharFilter>>,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    pub fn new<S: Into<String>>(name: S, tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: name.into(),
            char_filters: Vec::new(),
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Stage names as `char_filters|tokenizer|filters`, each group comma
    /// separated; the char filter group is omitted when empty.
    pub fn describe(&self) -> String {
        let join = |names: Vec<&str>| names.join(",");
        let filters = join(self.filters.iter().map(|f| f.name()).collect());
        if self.char_filters.is_empty() {
            format!("{}|{filters}", self.tokenizer.name())
        } else {
            let char_filters = join(self.char_filters.iter().map(|c| c.name()).collect());
            format!("{char_filters}|{}|{filters}", self.tokenizer.name())
        }
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut normalized = text.to_string();
        for char_filter in &self.char_filters {
            normalized = char_filter.filter(&normalized);
        }

        self.filters
            .iter()
            .try_fold(self.tokenizer.tokenize(&normalized)?, |tokens, filter| {
                filter.filter(tokens)
            })
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipelineAnalyzer({}: {})", self.name, self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;

    fn words(analyzer: &PipelineAnalyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).unwrap().map(|t| t.text).collect()
    }

    #[test]
    fn test_filters_run_in_order() {
        let analyzer = PipelineAnalyzer::new("plain", Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));
        assert_eq!(words(&analyzer, "Hello WORLD"), vec!["hello", "world"]);
    }

    #[test]
    fn test_char_filters_run_before_tokenizer() {
        let analyzer = PipelineAnalyzer::new("dash_split", Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new("-", " ").unwrap()));
        assert_eq!(words(&analyzer, "crème-brûlée"), vec!["crème", "brûlée"]);
    }

    #[test]
    fn test_describe_and_debug() {
        let analyzer = PipelineAnalyzer::new("review", Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new("[0-9]", "").unwrap()))
            .add_filter(Arc::new(LowercaseFilter::new()));
        assert_eq!(analyzer.describe(), "pattern_replace|whitespace|lowercase");
        assert_eq!(
            format!("{analyzer:?}"),
            "PipelineAnalyzer(review: pattern_replace|whitespace|lowercase)"
        );
    }
}
