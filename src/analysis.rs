//! Text analysis module for Tastebud.
//!
//! This module turns raw review text into the normalized, stemmed token
//! sequence that both training and inference feed to the vectorizer. It is
//! organized as a classic analysis chain:
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Tokens
//! ```
//!
//! [`analyzer::ReviewAnalyzer`] is the fixed chain used for reviews; the
//! building blocks are reusable on their own.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
