use thiserror::Error;

/// Every way an analysis can fail. Errors propagate to the caller unrecovered;
/// temporary files are dropped on every path.
#[derive(Debug, Error)]
pub enum MitoEditError {
    #[error("malformed sequence: {0}")]
    MalformedSequence(String),

    #[error("position {position} is outside the sequence (length {length})")]
    PositionOutOfRange { position: usize, length: usize },

    #[error("invalid base '{0}': expected one of A, C, G, T")]
    InvalidBase(String),

    #[error("reference base mismatch at position {position}: expected {expected}, sequence has {found}")]
    ReferenceBaseMismatch {
        position: usize,
        expected: char,
        found: char,
    },

    #[error("the base {base} at position {position} cannot be edited by {pipeline}")]
    UnEditableBase {
        position: usize,
        base: char,
        pipeline: String,
    },

    #[error("no pipeline found for reference base {reference} and mutant base {mutant}")]
    NoPipeline { reference: char, mutant: char },

    #[error("array design tool failed: {0}")]
    ExternalTool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("table error: {0}")]
    Table(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MitoEditError>;
