//! Machine learning building blocks for review sentiment.
//!
//! Everything here works on dense `f64` feature matrices (`Vec<Vec<f64>>`,
//! one row per review) and `u8` class labels, which is all a corpus of a few
//! thousand short reviews needs.
//!
//! - [`tfidf::TfIdfVectorizer`] - n-gram TF-IDF features
//! - [`naive_bayes::MultinomialNb`] - multinomial naive Bayes classifier
//! - [`model_selection`] - stratified splitting, k-fold CV and grid search
//! - [`metrics`] - accuracy, precision, recall, F1 and confusion matrices

pub mod metrics;
pub mod model_selection;
pub mod naive_bayes;
pub mod tfidf;
