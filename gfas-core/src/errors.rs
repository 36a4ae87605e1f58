use std::path::PathBuf;
use thiserror::Error;

/// Error type for building emission-factor tables and compositing emission fields.
///
/// Every variant is fatal for a run: the inputs are static files, so nothing is retried.
#[derive(Error, Debug)]
pub enum GfasError {
    #[error("Unexpected emission-factor table columns. Expected {expected:?}, got {actual:?}")]
    Schema {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("Unknown species {name:?} in emission-factor table row {row}")]
    UnknownSpecies { name: String, row: usize },
    #[error("Unknown land cover type {name:?} in emission-factor table row {row}")]
    UnknownLandCover { name: String, row: usize },
    #[error("Expected exactly one emission-factor row for species={species}, land cover={land_cover}, found {found}")]
    Lookup {
        species: String,
        land_cover: String,
        found: usize,
    },
    #[error("No emission factor for factor set={factor_set}, species={species}, land cover={land_cover}")]
    MissingFactor {
        factor_set: String,
        species: String,
        land_cover: String,
    },
    #[error("Invalid input field: {0}")]
    InputValidation(String),
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("{0}")]
    Config(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed emission-factor table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed grid record in {path} at line {line}: {source}")]
    Record {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed parameter file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GfasError {
    /// Wrap an I/O error together with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GfasError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type for `Result<T, GfasError>`.
pub type GfasResult<T> = Result<T, GfasError>;
