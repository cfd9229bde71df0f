//! Session cache for the joined base dataset.
//!
//! The load (CSV parsing, normalization, spatial join) runs once. Later
//! renders reuse the cached [`BaseDataset`] until the caller invalidates
//! the cache or a source file's identity changes.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

use crate::config::PipelineConfig;
use crate::dataset::BaseDataset;
use crate::progress::ProgressCallback;
use crate::{LoadError, PipelineError};

/// SHA-256 over a configuration and the path, size, and modification time
/// of every source file it names. File contents are not read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint(String);

impl SourceFingerprint {
    /// Fingerprints `config` and the current state of its source files.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if a source file's
    /// metadata can't be read.
    pub fn compute(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(config)?);

        for path in config.source_paths() {
            hash_file_identity(&mut hasher, path).map_err(|source| {
                PipelineError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        }

        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Lowercase hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_file_identity(hasher: &mut Sha256, path: &Path) -> Result<(), LoadError> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update([0]);
    hasher.update(metadata.len().to_le_bytes());
    hasher.update(modified.as_nanos().to_le_bytes());
    Ok(())
}

/// Holds at most one loaded dataset, keyed by its [`SourceFingerprint`].
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceFingerprint, Arc<BaseDataset>)>,
}

impl DatasetCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Returns the cached dataset if `config` and its sources are
    /// unchanged, otherwise loads and caches a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if fingerprinting or loading fails. A
    /// failed load leaves the cache empty.
    pub fn get_or_load(
        &mut self,
        config: &PipelineConfig,
        progress: &dyn ProgressCallback,
    ) -> Result<Arc<BaseDataset>, PipelineError> {
        let fingerprint = SourceFingerprint::compute(config)?;

        if let Some((cached, dataset)) = &self.entry {
            if *cached == fingerprint {
                log::debug!("Reusing cached dataset {fingerprint}");
                return Ok(Arc::clone(dataset));
            }
            log::info!("Source datasets changed, reloading");
        }

        self.entry = None;
        let dataset = Arc::new(BaseDataset::load(config, progress)?);
        self.entry = Some((fingerprint, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drops the cached dataset so the next call reloads.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::info!("Dataset cache invalidated");
        }
    }

    /// Whether a dataset is cached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }

    /// Fingerprint of the cached dataset.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&SourceFingerprint> {
        self.entry.as_ref().map(|(fingerprint, _)| fingerprint)
    }
}
