//! Model selection: stratified splitting, k-fold cross-validation and the
//! smoothing grid search for [`MultinomialNb`].
//!
//! All routines return sample indices so that callers keep ownership of the
//! feature matrix; rows are borrowed per fold and never copied.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};
use crate::ml::metrics::f1_score;
use crate::ml::naive_bayes::MultinomialNb;

/// Train and test sample indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Sorted distinct labels and how often each occurs.
fn class_counts(y: &[u8]) -> (Vec<u8>, Vec<usize>) {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    let counts = classes
        .iter()
        .map(|c| y.iter().filter(|&label| label == c).count())
        .collect();
    (classes, counts)
}

/// Spread `n_draws` over classes proportionally to `counts`. Remaining draws
/// go to the largest fractional parts, lower class first on ties.
fn approximate_allocation(counts: &[usize], n_draws: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let continuous: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * n_draws as f64 / total as f64)
        .collect();
    let mut allocation: Vec<usize> = continuous.iter().map(|v| v.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = continuous[a] - continuous[a].floor();
        let rb = continuous[b] - continuous[b].floor();
        rb.total_cmp(&ra)
    });

    let mut missing = n_draws.saturating_sub(allocation.iter().sum());
    for class in order {
        if missing == 0 {
            break;
        }
        if allocation[class] < counts[class] {
            allocation[class] += 1;
            missing -= 1;
        }
    }
    allocation
}

/// Split sample indices into a train and a test part with the same class
/// proportions as `y`.
///
/// `test_size` is the fraction of samples in the test part, rounded up. The
/// result depends only on `y`, `test_size` and `seed`.
pub fn stratified_train_test_split(y: &[u8], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if test_size.is_nan() || test_size <= 0.0 || test_size >= 1.0 {
        return Err(TastebudError::invalid_config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let n = y.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    let (classes, counts) = class_counts(y);

    if let Some(min) = counts.iter().min() {
        if *min < 2 {
            return Err(TastebudError::dataset(
                "the least populated class has only 1 member; stratified splitting needs at least 2",
            ));
        }
    }
    if n_train < classes.len() || n_test < classes.len() {
        return Err(TastebudError::dataset(format!(
            "a split of {n_train} train / {n_test} test samples cannot hold all {} classes",
            classes.len()
        )));
    }

    let test_allocation = approximate_allocation(&counts, n_test);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);

    for (class, n_class_test) in classes.iter().zip(&test_allocation) {
        let mut members: Vec<usize> = (0..n).filter(|&i| y[i] == *class).collect();
        members.shuffle(&mut rng);
        let (class_test, class_train) = members.split_at(*n_class_test);
        test.extend_from_slice(class_test);
        train.extend_from_slice(class_train);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    debug!(
        "Stratified split: {} train, {} test (test per class {:?})",
        train.len(),
        test.len(),
        test_allocation
    );

    Ok(TrainTestSplit { train, test })
}

/// Stratified k-fold cross-validation without shuffling.
///
/// Each fold keeps approximately the class proportions of the whole set.
/// Samples of a class are dealt to folds in order of appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(TastebudError::invalid_config(format!(
                "k-fold cross-validation requires at least 2 splits, got {n_splits}"
            )));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Test fold number of every sample.
    pub fn test_folds(&self, y: &[u8]) -> Result<Vec<usize>> {
        if y.len() < self.n_splits {
            return Err(TastebudError::dataset(format!(
                "cannot have {} folds with only {} samples",
                self.n_splits,
                y.len()
            )));
        }

        // classes numbered in order of first appearance
        let mut first_seen: Vec<u8> = Vec::new();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| match first_seen.iter().position(|c| c == label) {
                Some(k) => k,
                None => {
                    first_seen.push(*label);
                    first_seen.len() - 1
                }
            })
            .collect();
        let n_classes = first_seen.len();

        let mut counts = vec![0usize; n_classes];
        for &k in &encoded {
            counts[k] += 1;
        }
        if counts.iter().all(|&c| self.n_splits > c) {
            return Err(TastebudError::dataset(format!(
                "n_splits={} cannot be greater than the number of members in each class",
                self.n_splits
            )));
        }
        if let Some(&min) = counts.iter().min() {
            if self.n_splits > min {
                warn!(
                    "The least populated class has only {min} members, which is less than n_splits={}",
                    self.n_splits
                );
            }
        }

        // allocation[fold][class]: members of `class` at positions fold, fold + k, ...
        // of the sorted encoded labels
        let mut sorted = encoded.clone();
        sorted.sort_unstable();
        let mut allocation = vec![vec![0usize; n_classes]; self.n_splits];
        for (position, &k) in sorted.iter().enumerate() {
            allocation[position % self.n_splits][k] += 1;
        }

        let mut test_folds = vec![0usize; y.len()];
        for class in 0..n_classes {
            let mut folds_for_class = (0..self.n_splits)
                .flat_map(|fold| std::iter::repeat_n(fold, allocation[fold][class]));
            for (sample, _) in encoded.iter().enumerate().filter(|(_, k)| **k == class) {
                test_folds[sample] = folds_for_class.next().unwrap_or(self.n_splits - 1);
            }
        }

        Ok(test_folds)
    }

    /// Train/test indices for every fold, both in ascending order.
    pub fn split(&self, y: &[u8]) -> Result<Vec<TrainTestSplit>> {
        let test_folds = self.test_folds(y)?;
        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| test_folds[i] == fold);
                TrainTestSplit { train, test }
            })
            .collect())
    }
}

fn select<'a, R>(x: &'a [R], indices: &[usize]) -> Vec<&'a R> {
    indices.iter().map(|&i| &x[i]).collect()
}

fn select_labels(y: &[u8], indices: &[usize]) -> Vec<u8> {
    indices.iter().map(|&i| y[i]).collect()
}

/// F1 of a classifier with smoothing `alpha` on each fold of `cv`.
pub fn cross_val_score<R>(x: &[R], y: &[u8], alpha: f64, cv: &StratifiedKFold) -> Result<Vec<f64>>
where
    R: AsRef<[f64]> + Sync,
{
    if x.len() != y.len() {
        return Err(TastebudError::model(format!(
            "found {} samples but {} labels",
            x.len(),
            y.len()
        )));
    }

    cv.split(y)?
        .par_iter()
        .map(|fold| {
            let mut model = MultinomialNb::new(alpha)?;
            model.fit(&select(x, &fold.train), &select_labels(y, &fold.train))?;
            let predicted = model.predict_batch(&select(x, &fold.test))?;
            f1_score(&select_labels(y, &fold.test), &predicted)
        })
        .collect()
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Cross-validated score of one grid candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub alpha: f64,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

/// Outcome of a [`GridSearch`].
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_alpha: f64,
    pub best_score: f64,
    /// Candidates in grid order.
    pub candidates: Vec<CandidateScore>,
    /// Classifier with `best_alpha` refit on all samples passed to the search.
    pub best_estimator: MultinomialNb,
}

/// Exhaustive search over the smoothing parameter, scored by mean F1.
#[derive(Debug, Clone)]
pub struct GridSearch {
    alphas: Vec<f64>,
    cv: StratifiedKFold,
}

impl GridSearch {
    pub fn new(alphas: Vec<f64>, cv: StratifiedKFold) -> Result<Self> {
        if alphas.is_empty() {
            return Err(TastebudError::invalid_config("alpha grid is empty"));
        }
        if let Some(bad) = alphas.iter().find(|a| a.is_nan() || **a < 0.0) {
            return Err(TastebudError::invalid_config(format!(
                "alpha grid contains invalid value {bad}"
            )));
        }
        Ok(Self { alphas, cv })
    }

    /// Score every candidate, pick the best (first wins ties) and refit it.
    pub fn fit<R>(&self, x: &[R], y: &[u8]) -> Result<GridSearchResult>
    where
        R: AsRef<[f64]> + Sync,
    {
        info!(
            "Grid search over alpha {:?} with {}-fold stratified CV",
            self.alphas,
            self.cv.n_splits()
        );

        let candidates: Vec<CandidateScore> = self
            .alphas
            .par_iter()
            .map(|&alpha| {
                let fold_scores = cross_val_score(x, y, alpha, &self.cv)?;
                let (mean_score, std_score) = mean_std(&fold_scores);
                debug!("alpha={alpha}: mean F1 {mean_score:.4} (std {std_score:.4})");
                Ok(CandidateScore {
                    alpha,
                    fold_scores,
                    mean_score,
                    std_score,
                })
            })
            .collect::<Result<_>>()?;

        let mut best = 0;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.mean_score > candidates[best].mean_score {
                best = i;
            }
        }
        let best_alpha = candidates[best].alpha;
        let best_score = candidates[best].mean_score;

        let mut best_estimator = MultinomialNb::new(best_alpha)?;
        best_estimator.fit(x, y)?;

        Ok(GridSearchResult {
            best_alpha,
            best_score,
            candidates,
            best_estimator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratified_split_proportions() {
        // 12 negatives, 8 positives
        let y: Vec<u8> = (0..20).map(|i| u8::from(i % 5 < 2)).collect();
        let split = stratified_train_test_split(&y, 0.25, 0).unwrap();

        assert_eq!(split.test.len(), 5);
        assert_eq!(split.train.len(), 15);
        let positives_in_test = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(positives_in_test, 2);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_split_is_reproducible() {
        let y: Vec<u8> = (0..40).map(|i| (i % 2) as u8).collect();
        let a = stratified_train_test_split(&y, 0.25, 7).unwrap();
        let b = stratified_train_test_split(&y, 0.25, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stratified_split_errors() {
        let y = vec![0, 0, 1, 1];
        assert!(stratified_train_test_split(&y, 0.0, 0).is_err());
        assert!(stratified_train_test_split(&y, 1.0, 0).is_err());
        assert!(stratified_train_test_split(&[0, 0, 0, 1], 0.5, 0).is_err());
        assert!(stratified_train_test_split(&y, 0.1, 0).is_err());
    }

    #[test]
    fn test_approximate_allocation() {
        assert_eq!(approximate_allocation(&[12, 8], 5), vec![3, 2]);
        assert_eq!(approximate_allocation(&[5, 5], 5), vec![3, 2]);
        assert_eq!(approximate_allocation(&[3, 1], 2), vec![2, 0]);
    }

    #[test]
    fn test_kfold_matches_reference_assignment() {
        // classes in order of appearance: 1 -> k0, 0 -> k1
        let y = [1, 1, 0, 0, 0, 1, 0, 1, 0, 0];
        let cv = StratifiedKFold::new(2).unwrap();
        let folds = cv.test_folds(&y).unwrap();
        assert_eq!(folds, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);

        let splits = cv.split(&y).unwrap();
        assert_eq!(splits[0].test, vec![0, 1, 2, 3, 4]);
        assert_eq!(splits[0].train, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_kfold_preserves_proportions() {
        let y: Vec<u8> = (0..50).map(|i| u8::from(i % 5 == 0)).collect();
        let cv = StratifiedKFold::new(5).unwrap();
        for split in cv.split(&y).unwrap() {
            assert_eq!(split.test.len(), 10);
            assert_eq!(split.test.iter().filter(|&&i| y[i] == 1).count(), 2);
            assert_eq!(split.train.len() + split.test.len(), 50);
        }
    }

    #[test]
    fn test_kfold_errors() {
        assert!(StratifiedKFold::new(1).is_err());
        let cv = StratifiedKFold::new(5).unwrap();
        assert!(cv.split(&[0, 1, 0]).is_err());
        assert!(cv.split(&[0, 0, 0, 1, 1, 1, 1]).is_err());
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((std - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    fn separable() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let strength = 1.0 + (i % 4) as f64;
            if i % 2 == 0 {
                x.push(vec![strength, 0.0, 0.5]);
                y.push(1);
            } else {
                x.push(vec![0.0, strength, 0.5]);
                y.push(0);
            }
        }
        (x, y)
    }

    #[test]
    fn test_cross_val_score() {
        let (x, y) = separable();
        let cv = StratifiedKFold::new(5).unwrap();
        let scores = cross_val_score(&x, &y, 1.0, &cv).unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|&s| (s - 1.0).abs() < 1e-12));

        assert!(cross_val_score(&x, &y[..3], 1.0, &cv).is_err());
    }

    #[test]
    fn test_grid_search_prefers_first_on_ties() {
        let (x, y) = separable();
        let cv = StratifiedKFold::new(5).unwrap();
        let search = GridSearch::new(vec![0.1, 0.5, 1.0, 2.0], cv).unwrap();
        let result = search.fit(&x, &y).unwrap();

        assert_eq!(result.candidates.len(), 4);
        assert_eq!(result.candidates[2].alpha, 1.0);
        // every alpha separates the data perfectly
        assert_eq!(result.best_alpha, 0.1);
        assert!((result.best_score - 1.0).abs() < 1e-12);
        assert_eq!(result.best_estimator.alpha(), 0.1);
        assert_eq!(result.best_estimator.predict_batch(&x).unwrap(), y);
    }

    #[test]
    fn test_grid_search_validation() {
        let cv = StratifiedKFold::new(3).unwrap();
        assert!(GridSearch::new(vec![], cv).is_err());
        assert!(GridSearch::new(vec![1.0, -1.0], cv).is_err());
    }
}
