//! Persisted training artifacts.
//!
//! The fitted vectorizer and classifier are stored as binary blobs:
//!
//! ```text
//! magic [4] | format_version u16 | fingerprint_len u32 | fingerprint [utf-8]
//!           | run_id_len u32 | run_id [utf-8]
//!           | payload_len u64 | crc32 u32 | payload [bincode]
//! ```
//!
//! All integers are little endian. The fingerprint is the
//! [`ReviewAnalyzer`](crate::analysis::analyzer::ReviewAnalyzer) fingerprint
//! of the training run; a blob is only loaded by a process whose pipeline
//! produces the same fingerprint. The run id is unique per training run and
//! pairs a classifier with the vectorizer it was fitted against.
//!
//! Training metadata is written next to the blobs as pretty printed JSON
//! ([`ModelMetadata`]).

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};
use crate::ml::metrics::ConfusionMatrix;
use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::tfidf::TfIdfVectorizer;

/// Version of the blob layout.
pub const FORMAT_VERSION: u16 = 2;

/// A value stored as a blob.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Leading bytes identifying the artifact type.
    const MAGIC: [u8; 4];
    /// Human readable name used in messages.
    const KIND: &'static str;
}

impl Artifact for TfIdfVectorizer {
    const MAGIC: [u8; 4] = *b"TBTV";
    const KIND: &'static str = "Vectorizer";
}

impl Artifact for MultinomialNb {
    const MAGIC: [u8; 4] = *b"TBNB";
    const KIND: &'static str = "Model";
}

/// Provenance recorded in front of every blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHeader {
    /// Fingerprint of the text pipeline used for training.
    pub fingerprint: String,
    /// Identifier of the training run that produced the blob.
    pub run_id: String,
}

impl BlobHeader {
    pub fn new<F: Into<String>, R: Into<String>>(fingerprint: F, run_id: R) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            run_id: run_id.into(),
        }
    }
}

fn put_str(blob: &mut Vec<u8>, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| TastebudError::serialization("header field too long"))?;
    blob.extend_from_slice(&len.to_le_bytes());
    blob.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Serialize `value` into a blob stamped with `header`.
pub fn encode<A: Artifact>(value: &A, header: &BlobHeader) -> Result<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|e| {
        TastebudError::serialization(format!("Failed to encode {}: {e}", A::KIND))
    })?;

    let mut blob = Vec::with_capacity(
        32 + header.fingerprint.len() + header.run_id.len() + payload.len(),
    );
    blob.extend_from_slice(&A::MAGIC);
    blob.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    put_str(&mut blob, &header.fingerprint)?;
    put_str(&mut blob, &header.run_id)?;
    blob.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    blob.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    blob.extend_from_slice(&payload);
    Ok(blob)
}

/// Cursor over a blob that fails with an incompatibility error on truncation.
struct BlobReader<'a> {
    kind: &'static str,
    data: &'a [u8],
}

impl<'a> BlobReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data.len() < n {
            return Err(TastebudError::incompatible(format!(
                "{} artifact is truncated",
                self.kind
            )));
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let len = u32::from_le_bytes(self.array()?) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            TastebudError::incompatible(format!("{} artifact has a corrupt {field}", self.kind))
        })
    }
}

fn read_header<A: Artifact>(reader: &mut BlobReader<'_>) -> Result<BlobHeader> {
    let magic: [u8; 4] = reader.array()?;
    if magic != A::MAGIC {
        return Err(TastebudError::incompatible(format!(
            "not a {} artifact (magic {magic:?})",
            A::KIND
        )));
    }
    let version = u16::from_le_bytes(reader.array()?);
    if version != FORMAT_VERSION {
        return Err(TastebudError::incompatible(format!(
            "{} artifact has format version {version}, expected {FORMAT_VERSION}; \
             retrain the model",
            A::KIND
        )));
    }
    let fingerprint = reader.string("fingerprint")?;
    let run_id = reader.string("run id")?;
    Ok(BlobHeader {
        fingerprint,
        run_id,
    })
}

/// Decode a blob, refusing it unless it was written under `fingerprint`.
/// Returns the recorded header along with the value.
pub fn decode<A: Artifact>(blob: &[u8], fingerprint: &str) -> Result<(BlobHeader, A)> {
    let mut reader = BlobReader {
        kind: A::KIND,
        data: blob,
    };
    let header = read_header::<A>(&mut reader)?;
    if header.fingerprint != fingerprint {
        return Err(TastebudError::incompatible(format!(
            "{} was trained with text pipeline {} but this build uses {fingerprint}; \
             retrain the model",
            A::KIND,
            header.fingerprint
        )));
    }

    let payload_len = u64::from_le_bytes(reader.array()?);
    let checksum = u32::from_le_bytes(reader.array()?);
    let payload_len = usize::try_from(payload_len)
        .map_err(|_| TastebudError::incompatible(format!("{} artifact is too large", A::KIND)))?;
    let payload = reader.take(payload_len)?;
    if crc32fast::hash(payload) != checksum {
        return Err(TastebudError::incompatible(format!(
            "{} artifact checksum mismatch",
            A::KIND
        )));
    }

    let (value, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map_err(|e| TastebudError::incompatible(format!("Failed to decode {}: {e}", A::KIND)))?;
    Ok((header, value))
}

/// Write `value` to `path` atomically: the blob goes to a temporary file in
/// the same directory which is then renamed over the target.
pub fn save_artifact<A: Artifact>(value: &A, header: &BlobHeader, path: &Path) -> Result<()> {
    let blob = encode(value, header)?;
    write_atomic(path, &blob)?;
    info!("{} saved to: {}", A::KIND, path.display());
    Ok(())
}

/// Load and validate a blob written by [`save_artifact`].
pub fn load_artifact<A: Artifact>(path: &Path, fingerprint: &str) -> Result<(BlobHeader, A)> {
    if !path.exists() {
        return Err(TastebudError::ArtifactNotFound {
            kind: A::KIND,
            path: path.to_path_buf(),
        });
    }
    let blob = fs::read(path)?;
    debug!("Read {} bytes from {}", blob.len(), path.display());
    decode(&blob, fingerprint)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| TastebudError::other(format!("invalid path {}", path.display())))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Size of the data a model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetShape {
    pub samples: usize,
    pub features: usize,
}

/// Evaluation results of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub cv_f1_mean: f64,
    pub cv_f1_std: f64,
    pub cv_f1_scores: Vec<f64>,
    pub confusion_matrix: ConfusionMatrix,
}

/// JSON sidecar describing a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    /// Identifier stamped into both blobs of the run.
    pub run_id: String,
    pub trained_date: DateTime<Utc>,
    pub algorithm: String,
    pub vectorizer: String,
    pub max_features: usize,
    pub ngram_range: [usize; 2],
    pub best_alpha: f64,
    pub param_grid: Vec<f64>,
    /// Fingerprint of the text pipeline used for training.
    pub pipeline: String,
    pub dataset: DatasetShape,
    pub metrics: MetricsRecord,
}

impl ModelMetadata {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())?;
        info!("Metrics saved to: {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TastebudError::ArtifactNotFound {
                kind: "Metrics",
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
