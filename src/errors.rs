// errors.rs
use std::fmt;

/// Errors that halt a pipeline run. Anything that is merely suspicious
/// (nulls in required fields, out-of-range numerics) is a warning and lives
/// in the reports instead, and never shows up here.
#[derive(Debug)]
pub enum PipelineError {
    /// Missing configuration (API key, bad data dir, ...).
    Config(String),
    /// The upstream listings API failed or returned nothing usable.
    Api(String),
    /// Fatal schema problem: required column missing, duplicate primary
    /// keys, invalid boolean domain value, or a row without a property_id.
    Schema(String),
    /// A numeric column held non-numeric, non-missing text. Aborts the
    /// whole load batch; there is no row-by-row recovery.
    Coercion {
        column: String,
        value: String,
        row: usize,
    },
    DbError(String),
    Csv(String),
    IoError(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(msg) => write!(f, "Config error: {msg}"),
            PipelineError::Api(msg) => write!(f, "API error: {msg}"),
            PipelineError::Schema(msg) => write!(f, "Schema error: {msg}"),
            PipelineError::Coercion { column, value, row } => write!(
                f,
                "Coercion error: column '{column}' row {row}: '{value}' is not numeric"
            ),
            PipelineError::DbError(msg) => write!(f, "Database error: {msg}"),
            PipelineError::Csv(msg) => write!(f, "CSV error: {msg}"),
            PipelineError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        PipelineError::DbError(e.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::IoError(e.to_string())
    }
}
