use thiserror::Error;

use super::config::ConfigError;
use super::kmeans::KMeansError;
use super::knee::KneeError;
use crate::core::io::energy::EnergyTableError;
use crate::core::io::report::ReportError;
use crate::core::models::geometry::GeometryError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read geometry '{path}': {source}", path = path.display())]
    Geometry {
        path: PathBuf,
        #[source]
        source: GeometryError,
    },

    #[error("Conformer '{path}' does not match the first conformer: {reason}", path = path.display())]
    InconsistentGeometry { path: PathBuf, reason: String },

    #[error("Energy table error: {0}")]
    EnergyTable(#[from] EnergyTableError),

    #[error("No conformers were provided")]
    EmptyPopulation,

    #[error("No candidate cluster counts for {conformers} conformers; widen the k range")]
    NoCandidates { conformers: usize },

    #[error("K-means failed: {0}")]
    KMeans(#[from] KMeansError),

    #[error("Insufficient data for knee detection: {0}")]
    Knee(#[from] KneeError),

    #[error("Got {labels} cluster labels for {rows} conformers")]
    LabelMismatch { labels: usize, rows: usize },

    #[error("Output directory '{path}' already exists; remove or rename it first", path = path.display())]
    OutputExists { path: PathBuf },

    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report '{path}': {source}", path = path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: ReportError,
    },

    #[error("Worker pool could not be created: {0}")]
    WorkerPool(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
