//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows from the tokenizer through the token
//! filters. Filters rewrite its text or drop it from the stream; the
//! position always refers to the tokenizer output.
//!
//! ```
//! use tastebud::analysis::token::Token;
//!
//! let token = Token::new("Loved", 1).with_text("love");
//! assert_eq!(token.text, "love");
//! assert_eq!(token.position, 1);
//! ```

use std::fmt;

/// A single word of a review on its way through the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Index in the tokenizer output, kept when earlier tokens are dropped.
    pub position: usize,
}

impl Token {
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }

    /// Replace the text, keeping the position.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokens moving between pipeline stages.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
