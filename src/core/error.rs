use crate::allocate::AllocationError;
use crate::core::types::NeighbourhoodId;
use thiserror::Error;

/// Fatal pipeline errors
///
/// Anything recoverable at record level is a `DataQualityIssue` instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Reference table error: {0}")]
    ReferenceTable(String),

    #[error("Invariant violated in neighbourhood {neighbourhood}: {detail}")]
    InvariantViolation {
        neighbourhood: NeighbourhoodId,
        detail: String,
    },

    #[error("Allocation failed in neighbourhood {neighbourhood}: {source}")]
    Allocation {
        neighbourhood: NeighbourhoodId,
        #[source]
        source: AllocationError,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
