use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoverageError>;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Invalid grid dimensions: {rows}x{cols} (both must be positive)")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Invalid radius: {0} (must be within 0..={max})", max = u32::MAX)]
    InvalidRadius(i64),

    #[error("Invalid block coverage: {0} (must be within [0, 1])")]
    InvalidCoverage(f64),

    #[error("Ragged grid at row {row}: expected {expected} columns, got {got}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Cannot block {requested} cells: only {available} positions available")]
    BlockExhaustion { requested: usize, available: usize },

    #[error("Invalid grid map at line {line}: unexpected character {ch:?}")]
    InvalidGridMap { line: usize, ch: char },

    #[error("Plan invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(String),
}

impl CoverageError {
    /// Errors caused by caller input rather than by the environment.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CoverageError::InvalidDimensions { .. }
                | CoverageError::InvalidRadius(_)
                | CoverageError::InvalidCoverage(_)
                | CoverageError::RaggedGrid { .. }
                | CoverageError::BlockExhaustion { .. }
                | CoverageError::InvalidGridMap { .. }
        )
    }
}

impl From<toml::de::Error> for CoverageError {
    fn from(err: toml::de::Error) -> Self {
        CoverageError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<serde_json::Error> for CoverageError {
    fn from(err: serde_json::Error) -> Self {
        CoverageError::Json(err.to_string())
    }
}
