#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end crash map pipeline.
//!
//! Reads the datasets named by a [`PipelineConfig`], normalizes and joins
//! them once into a [`BaseDataset`], and renders map layers from it for
//! each set of [`FilterCriteria`](crash_map_layer_models::FilterCriteria).
//! [`DatasetCache`] keeps the joined dataset across renders until the
//! source files change or it is invalidated.

pub mod cache;
pub mod config;
pub mod dataset;
#[cfg(test)]
mod fixtures;
pub mod progress;
pub mod sources;

use std::path::PathBuf;

pub use cache::{DatasetCache, SourceFingerprint};
pub use config::PipelineConfig;
pub use dataset::{BaseDataset, MapRender};

/// Errors from reading one source dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A configured column is not in the CSV header row.
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// The `GeoJSON` document is a bare geometry.
    #[error("Expected a FeatureCollection or Feature")]
    NotFeatureCollection,
}

/// Errors that make a pipeline load fail.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source dataset could not be read or parsed.
    #[error("Source unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        /// Path of the dataset.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: LoadError,
    },

    /// The configuration file is not valid.
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading a file other than a dataset failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration could not be serialized for fingerprinting.
    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),
}
