//! The review analyzer: the single text pipeline shared by training and
//! inference.
//!
//! ```text
//! "Wow... Loved this place."
//!   → [^a-zA-Z] → " "     "Wow    Loved this place "
//!   → whitespace split    [Wow, Loved, this, place]
//!   → lowercase           [wow, loved, this, place]
//!   → stop words          [wow, loved, place]
//!   → porter              [wow, love, place]
//!   → join                "wow love place"
//! ```
//!
//! Any change to this chain changes the features a trained model expects, so
//! every artifact records [`ReviewAnalyzer::fingerprint`] and loading refuses
//! artifacts produced under a different one.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stem::{PorterStemmer, StemFilter, Stemmer};
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::Result;

/// Version of the review pipeline. Bump whenever the chain changes.
pub const PIPELINE_VERSION: u32 = 1;

/// Characters outside this class are replaced by a space.
pub const NON_LETTER_PATTERN: &str = "[^a-zA-Z]";

/// Stop words kept in the stream; negation carries sentiment.
pub const STOP_WORD_EXEMPTIONS: &[&str] = &["not"];

/// The feature pipeline for restaurant reviews.
///
/// Cheap to clone; every stage is behind an `Arc`.
#[derive(Clone)]
pub struct ReviewAnalyzer {
    inner: PipelineAnalyzer,
    fingerprint: String,
}

impl ReviewAnalyzer {
    pub fn new() -> Result<Self> {
        let char_filter = PatternReplaceCharFilter::new(NON_LETTER_PATTERN, " ")?;
        let stop_filter = StopFilter::new().with_exemptions(STOP_WORD_EXEMPTIONS.iter().copied());
        let stemmer = PorterStemmer::new();
        let stemmer_name = stemmer.name();

        let inner = PipelineAnalyzer::new("review", Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(char_filter.clone()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(stop_filter.clone()))
            .add_filter(Arc::new(StemFilter::with_stemmer(Box::new(stemmer))));
        let fingerprint = fingerprint(&inner.describe(), &char_filter, &stop_filter, stemmer_name);

        Ok(Self { inner, fingerprint })
    }

    /// Turn a raw review into its processed form: surviving stems joined by
    /// single spaces. Text without letters yields an empty string.
    pub fn process(&self, text: &str) -> Result<String> {
        let stems: Vec<String> = self.inner.analyze(text)?.map(|token| token.text).collect();
        Ok(stems.join(" "))
    }

    /// Stable identifier of this pipeline, e.g. `review-v1-1a2b3c4d`.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint(
    stages: &str,
    char_filter: &PatternReplaceCharFilter,
    stop: &StopFilter,
    stemmer: &str,
) -> String {
    let mut hasher = crc32fast::Hasher::new();
    let mut feed = |key: &str, value: &str| {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    };

    feed("version", &PIPELINE_VERSION.to_string());
    feed("stages", stages);
    feed("pattern", char_filter.pattern());
    feed("stopwords", &stop.sorted_stop_words().join(","));
    feed("exemptions", &stop.exemptions().collect::<Vec<_>>().join(","));
    feed("stemmer", stemmer);

    format!("review-v{PIPELINE_VERSION}-{:08x}", hasher.finalize())
}

impl Analyzer for ReviewAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "review"
    }
}

impl Debug for ReviewAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewAnalyzer")
            .field("inner", &self.inner)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_process() {
        let analyzer = ReviewAnalyzer::new().unwrap();

        let cases = [
            ("Wow... Loved this place.", "wow love place"),
            ("The food was not good at all!", "food not good"),
            ("Not tasty and the texture was just nasty.", "not tasti textur nasti"),
            (
                "The selection on the menu was great and so were the prices.",
                "select menu great price",
            ),
            ("Honeslty it didn't taste THAT fresh.)", "honeslti tast fresh"),
            ("I'm not eating here again, the waiters were rude!", "not eat waiter rude"),
        ];
        for (input, expected) in cases {
            assert_eq!(analyzer.process(input).unwrap(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_empty_results() {
        let analyzer = ReviewAnalyzer::new().unwrap();
        assert_eq!(analyzer.process("").unwrap(), "");
        assert_eq!(analyzer.process("12345 !!! ...").unwrap(), "");
        assert_eq!(analyzer.process("the and of").unwrap(), "");
    }

    #[test]
    fn test_analyze_keeps_positions() {
        let analyzer = ReviewAnalyzer::new().unwrap();
        let tokens: Vec<Token> = analyzer.analyze("The soup was cold").unwrap().collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["soup", "cold"]);
        assert_eq!(tokens[0].position, 1);
        assert_eq!(tokens[1].position, 3);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = ReviewAnalyzer::new().unwrap();
        let b = ReviewAnalyzer::new().unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.fingerprint().starts_with("review-v1-"));
        assert_eq!(a.fingerprint().len(), "review-v1-".len() + 8);
    }

    #[test]
    fn test_fingerprint_tracks_pipeline_parts() {
        const STAGES: &str = "pattern_replace|whitespace|lowercase,stop,stem";
        let char_filter = PatternReplaceCharFilter::new(NON_LETTER_PATTERN, " ").unwrap();
        let with_not = StopFilter::new().with_exemptions(["not"]);
        let without = StopFilter::new();
        let base = fingerprint(STAGES, &char_filter, &with_not, "porter_nltk");

        assert_eq!(base, ReviewAnalyzer::new().unwrap().fingerprint());
        assert_ne!(base, fingerprint(STAGES, &char_filter, &without, "porter_nltk"));
        assert_ne!(base, fingerprint(STAGES, &char_filter, &with_not, "snowball"));
        assert_ne!(
            base,
            fingerprint("pattern_replace|whitespace|stop,stem", &char_filter, &with_not, "porter_nltk")
        );
    }
}
