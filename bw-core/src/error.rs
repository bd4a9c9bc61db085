/// Error types for the bloomwatch core library
use crate::stage::Stage;
use thiserror::Error;

/// Errors raised while parsing a raw series payload.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload has no header row
    #[error("raw series has no header row")]
    MissingHeader,

    /// The header row has no `Date` column
    #[error("raw series header has no Date column")]
    MissingDateColumn,

    /// A body row's field count differs from the header's
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCountMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A body row's date cell could not be parsed
    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: u64, value: String },

    /// Underlying CSV reader failure
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Tagged failure of a single remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service answered with a non-success status
    #[error("HTTP error: status {0}")]
    Status(u16),

    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The call did not settle within its time budget
    #[error("request timed out")]
    Timeout,
}

/// Terminal error of an aborted pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The raw series fetch returned an empty body
    #[error("no data available for the selected region")]
    NoDataAvailable,

    /// The raw series fetch, its parse, or the history fetch failed
    #[error("{stage} stage failed: {message}")]
    Fatal { stage: Stage, message: String },
}

/// Type alias for Results using RemoteError
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
