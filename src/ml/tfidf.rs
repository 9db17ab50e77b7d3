//! TF-IDF vectorizer for text feature extraction.
//!
//! Documents are split into words of two or more word characters, expanded
//! into n-grams and weighted with a smoothed inverse document frequency:
//!
//! ```text
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//! tfidf(t)  = count(t, doc) * idf(t)
//! row       = tfidf / ||tfidf||₂
//! ```
//!
//! When `max_features` is set only the most frequent terms across the corpus
//! are kept (ties broken alphabetically). Feature indices always follow the
//! alphabetical order of the kept terms.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};

/// Configuration of a [`TfIdfVectorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// Keep at most this many terms, by corpus frequency.
    pub max_features: Option<usize>,
    /// Inclusive range of n-gram sizes.
    pub ngram_range: (usize, usize),
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: Some(1500),
            ngram_range: (1, 2),
        }
    }
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Vocabulary: term -> feature index.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency for each feature index.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Result<Self> {
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(TastebudError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if config.max_features == Some(0) {
            return Err(TastebudError::invalid_config(
                "max_features must be positive",
            ));
        }
        Ok(Self {
            config,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    /// Learn the vocabulary and idf weights from a corpus.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(TastebudError::model("cannot fit vectorizer on an empty corpus"));
        }

        let per_document: Vec<HashMap<String, usize>> = documents
            .par_iter()
            .map(|doc| self.term_counts(doc.as_ref()))
            .collect();

        let mut term_frequency: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for counts in &per_document {
            for (term, count) in counts {
                *term_frequency.entry(term.as_str()).or_insert(0) += count;
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(TastebudError::model(
                "empty vocabulary; the documents contain no terms",
            ));
        }

        let mut terms: Vec<&str> = term_frequency.keys().copied().collect();
        terms.sort_unstable();
        if let Some(limit) = self.config.max_features {
            if terms.len() > limit {
                // stable sort keeps alphabetical order among equal frequencies
                terms.sort_by(|a, b| term_frequency[b].cmp(&term_frequency[a]));
                terms.truncate(limit);
                terms.sort_unstable();
            }
        }

        let n = documents.len() as f64;
        self.idf = terms
            .iter()
            .map(|term| ((1.0 + n) / (1.0 + document_frequency[term] as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();
        self.n_documents = documents.len();

        debug!(
            "Fitted TF-IDF vectorizer: {} documents, {} candidate terms, {} features",
            self.n_documents,
            term_frequency.len(),
            self.vocabulary.len()
        );

        Ok(())
    }

    /// Fit on a corpus and return its feature matrix.
    pub fn fit_transform<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Transform a document into an L2-normalized TF-IDF feature vector.
    ///
    /// Terms outside the vocabulary are ignored; a document without known
    /// terms maps to the zero vector.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(TastebudError::model("vectorizer is not fitted"));
        }

        let mut features = vec![0.0; self.vocabulary.len()];
        for (term, count) in self.term_counts(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                features[index] = count as f64 * self.idf[index];
            }
        }

        let norm = features.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut features {
                *value /= norm;
            }
        }

        Ok(features)
    }

    /// Transform many documents, preserving order.
    pub fn transform_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Split a document into the terms counted by this vectorizer.
    pub fn build_terms(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| word.chars().nth(1).is_some())
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(words.len()) {
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    fn term_counts(&self, document: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for term in self.build_terms(document) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }

    /// Whether [`fit`](Self::fit) has been called successfully.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Get the size of the vocabulary, i.e. the feature vector length.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Term to feature index mapping.
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Terms in feature index order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.vocabulary.keys().map(String::as_str).collect()
    }

    /// Idf weight per feature index.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(max_features: Option<usize>) -> TfIdfVectorizer {
        TfIdfVectorizer::new(TfIdfConfig {
            max_features,
            ngram_range: (1, 2),
        })
        .unwrap()
    }

    #[test]
    fn test_build_terms() {
        let v = vectorizer(None);
        assert_eq!(
            v.build_terms("great food a b not good"),
            vec!["great", "food", "not", "good", "great food", "food not", "not good"]
        );
        assert!(v.build_terms("").is_empty());
        assert!(v.build_terms("a b c").is_empty());
    }

    #[test]
    fn test_fit_vocabulary_and_idf() {
        let mut v = vectorizer(None);
        v.fit(&["good food", "bad food"]).unwrap();

        assert_eq!(
            v.feature_names(),
            vec!["bad", "bad food", "food", "good", "good food"]
        );
        let n = 2.0_f64;
        let idf_rare = ((1.0 + n) / 2.0).ln() + 1.0;
        let idf_common = ((1.0 + n) / 3.0).ln() + 1.0;
        assert!((v.idf()[0] - idf_rare).abs() < 1e-12);
        assert!((v.idf()[2] - idf_common).abs() < 1e-12);
        assert_eq!(v.n_documents(), 2);
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let mut v = vectorizer(None);
        v.fit(&["good food", "bad food", "good service"]).unwrap();

        let row = v.transform("good food good").unwrap();
        let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);

        let zero = v.transform("").unwrap();
        assert_eq!(zero.len(), v.vocabulary_size());
        assert!(zero.iter().all(|&x| x == 0.0));

        let unknown = v.transform("zebra").unwrap();
        assert!(unknown.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut v = TfIdfVectorizer::new(TfIdfConfig {
            max_features: Some(2),
            ngram_range: (1, 1),
        })
        .unwrap();
        // food: 3, good: 2, bad: 1, zesty: 2 -> ties between good/zesty broken alphabetically
        v.fit(&["food good zesty", "food good", "food bad zesty"]).unwrap();
        assert_eq!(v.feature_names(), vec!["food", "good"]);
        assert_eq!(v.vocabulary()["good"], 1);
    }

    #[test]
    fn test_errors() {
        assert!(
            TfIdfVectorizer::new(TfIdfConfig {
                max_features: None,
                ngram_range: (2, 1)
            })
            .is_err()
        );
        assert!(
            TfIdfVectorizer::new(TfIdfConfig {
                max_features: Some(0),
                ngram_range: (1, 1)
            })
            .is_err()
        );

        let mut v = vectorizer(None);
        assert!(v.transform("good").is_err());
        assert!(v.fit::<&str>(&[]).is_err());
        assert!(v.fit(&["", "a"]).is_err());
    }

    #[test]
    fn test_fit_transform_matches_transform() {
        let docs = ["love place", "not good", "great food great"];
        let mut v = vectorizer(Some(1500));
        let matrix = v.fit_transform(&docs).unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[2], v.transform("great food great").unwrap());
    }
}
