//! Versioned, checksummed persistence for the fitted text model
//!
//! The artifact is a JSON envelope: schema version, SHA-256 checksum of the
//! payload, and the serialized model. Load fails fast on a version or
//! checksum mismatch so an incompatible or corrupted artifact can never
//! silently misclassify; the caller falls back to retraining.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::model::TextModel;
use crate::error::{Error, Result};

/// Bump when the serialized `TextModel` layout changes
const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    schema_version: u32,
    /// Hex SHA-256 of `payload`
    checksum: String,
    /// JSON-serialized `TextModel`
    payload: String,
}

/// File-backed store for the model artifact
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default artifact location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sift")
            .join("classifier.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a fitted model
    pub fn save(&self, model: &TextModel) -> Result<()> {
        let payload = serde_json::to_string(model)?;
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            checksum: checksum(&payload),
            payload,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec(&envelope)?)?;
        debug!("Saved classifier artifact to {}", self.path.display());
        Ok(())
    }

    /// Load a previously persisted model, verifying version and checksum
    pub fn load(&self) -> Result<TextModel> {
        let raw = std::fs::read_to_string(&self.path)?;
        let envelope: Envelope = serde_json::from_str(&raw)
            .map_err(|e| Error::Artifact(format!("malformed artifact: {}", e)))?;

        if envelope.schema_version != SCHEMA_VERSION {
            return Err(Error::Artifact(format!(
                "schema version mismatch: artifact is v{}, expected v{}",
                envelope.schema_version, SCHEMA_VERSION
            )));
        }

        let actual = checksum(&envelope.payload);
        if actual != envelope.checksum {
            return Err(Error::Artifact(format!(
                "checksum mismatch: expected {}, got {}",
                envelope.checksum, actual
            )));
        }

        Ok(serde_json::from_str(&envelope.payload)?)
    }
}

fn checksum(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}
