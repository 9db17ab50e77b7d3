//! Analyzer implementations that combine char filters, tokenizers and token
//! filters into one text processing pipeline.
//!
//! - [`analyzer::Analyzer`] - the core trait
//! - [`pipeline::PipelineAnalyzer`] - custom char filter + tokenizer + filter chains
//! - [`review::ReviewAnalyzer`] - the fixed pipeline applied to review text

#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod pipeline;
pub mod review;

pub use analyzer::Analyzer;
pub use pipeline::PipelineAnalyzer;
pub use review::ReviewAnalyzer;
