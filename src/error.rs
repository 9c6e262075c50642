use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Fatal errors: any of these aborts construction of a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Cannot find weather file at: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Meta-header sentinel not reached within {0:?}")]
    MetaHeaderTimeout(Duration),

    #[error("End of file reached before the '{0}' marker")]
    SentinelNotFound(String),

    #[error("Invalid meta-header at line {line}: {message}")]
    InvalidMetaHeader { line: usize, message: String },

    #[error("Missing required meta-header key: {0}")]
    MissingMetadataKey(&'static str),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Columns '{first}' and '{second}' both map to {field}")]
    AmbiguousHeader {
        field: &'static str,
        first: String,
        second: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Row-level failures. These never escape construction: the row is skipped
/// and the error is recorded in the ingest report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("cannot convert {field} value '{value}': {reason}")]
    Conversion {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("missing value for {field}")]
    MissingData { field: &'static str },

    #[error("derived quantity failed: {0}")]
    DerivedQuantity(String),
}

impl RowError {
    pub fn kind(&self) -> RowErrorKind {
        match self {
            RowError::Conversion { .. } => RowErrorKind::Conversion,
            RowError::MissingData { .. } => RowErrorKind::MissingData,
            RowError::DerivedQuantity(_) => RowErrorKind::DerivedQuantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    Conversion,
    MissingData,
    DerivedQuantity,
}

/// Cache failures are never fatal; they surface only through logging.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache file '{}'", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache data from '{}'", .0.display())]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Cache '{}' was built with ET model {found}, expected {expected}", .path.display())]
    ModelMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Cache '{}' was built with different parse options", .0.display())]
    OptionsMismatch(PathBuf),

    #[error("Failed to encode cache data")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to create cache directory '{}'", .0.display())]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{}'", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}
