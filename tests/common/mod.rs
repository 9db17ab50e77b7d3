//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tastebud::config::{ArtifactPaths, TrainingConfig};
use tastebud::dataset::Dataset;
use tastebud::inference::SentimentPredictor;
use tastebud::training::Trainer;

const POSITIVE: [&str; 20] = [
    "Great food and friendly staff.",
    "The pizza was delicious!",
    "Amazing service, loved it.",
    "Wonderful place with great prices.",
    "Fresh salad and tasty soup.",
    "Excellent pasta, perfect portions.",
    "Loved the friendly waiters.",
    "Delicious burgers and great fries.",
    "Perfect spot for a tasty dinner.",
    "The staff was amazing and friendly.",
    "Wonderful desserts, absolutely delicious.",
    "Great atmosphere and excellent food.",
    "Fresh bread, tasty and warm.",
    "Amazing steak, cooked perfect.",
    "I loved the wonderful music.",
    "Excellent service and great coffee.",
    "Tasty tacos and friendly owners.",
    "Delicious sushi, very fresh.",
    "Perfect brunch, amazing eggs.",
    "Great value and wonderful staff.",
];

const NEGATIVE: [&str; 20] = [
    "Terrible service and rude staff.",
    "The pizza was cold and bland.",
    "Awful food, never again.",
    "Horrible place with dirty tables.",
    "Slow service and disgusting soup.",
    "Worst pasta, tiny portions.",
    "Rude waiters ignored us.",
    "Bland burgers and soggy fries.",
    "Dirty restroom, horrible smell.",
    "The staff was rude and slow.",
    "Disgusting desserts, totally stale.",
    "Terrible atmosphere and awful food.",
    "Stale bread, cold and hard.",
    "Worst steak, overcooked and bland.",
    "The music was horrible and loud.",
    "Slow service and terrible coffee.",
    "Soggy tacos and rude owners.",
    "Awful sushi, not fresh at all.",
    "Cold eggs, worst brunch ever.",
    "Terrible value and dirty plates.",
];

/// Tab separated dataset text, alternating positive and negative rows.
pub fn dataset_tsv() -> String {
    let mut tsv = String::from("Review\tLiked\n");
    for (positive, negative) in POSITIVE.iter().zip(NEGATIVE.iter()) {
        tsv.push_str(&format!("{positive}\t1\n{negative}\t0\n"));
    }
    tsv
}

pub fn dataset() -> Dataset {
    Dataset::from_reader(dataset_tsv().as_bytes()).unwrap()
}

pub fn write_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("reviews.tsv");
    fs::write(&path, dataset_tsv()).unwrap();
    path
}

/// Training configuration writing artifacts below `dir`.
pub fn training_config(dir: &Path) -> TrainingConfig {
    TrainingConfig {
        dataset: write_dataset(dir),
        artifacts: ArtifactPaths::in_dir(dir.join("models")),
        ..TrainingConfig::default()
    }
}

/// Predictor trained in memory on the fixture dataset.
pub fn trained_predictor() -> SentimentPredictor {
    let trainer = Trainer::new(TrainingConfig::default()).unwrap();
    let (trained, _) = trainer.fit(&dataset()).unwrap();
    trained.into_predictor().unwrap()
}
