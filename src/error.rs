//! Error types reported while querying and analyzing "show" command output
//!
//! There are two layers here. The parsing pipeline only knows about the text
//! it was handed, so it reports StructureError and ResponseError. The service
//! layer knows which command was issued against which target, and wraps these
//! into Error so that a format drift in the upstream tool can be diagnosed
//! from the message alone.

use thiserror::Error;


/// Failure reported by the command-execution collaborator
///
/// This is whatever the transport layer came up with (connection refused,
/// timeout, JSON-RPC error...). It is propagated as-is, never retried.
///
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;


/// The text of a response does not have the shape expected for its command
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StructureError {
    /// A line sits at a depth that the record builder does not understand
    #[error("unexpected depth {depth} for line {line:?}")]
    UnexpectedDepth { depth: usize, line: String },

    /// A record header is missing its name terminator
    #[error("record header {line:?} has no colon")]
    MissingColon { line: String },

    /// A counter list carries a key that this builder does not know about
    #[error("unknown {group} counter {key:?} in line {line:?}")]
    UnknownCounter {
        group: &'static str,
        key: String,
        line: String,
    },

    /// A fixed-layout line does not have the expected number of fields
    #[error("expected {expected} fields, found {found}, in line {line:?}")]
    FieldCount {
        expected: usize,
        found: usize,
        line: String,
    },

    /// A positional field does not hold the expected literal or value
    #[error("unexpected value in the '{slot}' field of line {line:?}")]
    BadSlot { slot: &'static str, line: String },

    /// A child attribute appeared before any parent record was opened
    #[error("line {line:?} does not belong to any record")]
    Orphan { line: String },

    /// A child attribute is keyed by a token that this builder does not know
    #[error("unknown attribute {token:?} in line {line:?}")]
    UnknownAttribute { token: String, line: String },
}


/// Failure to turn a raw response into records
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// The command succeeded, but there is no text to analyze
    #[error("empty response")]
    Empty,

    /// The text does not match the expected shape
    #[error(transparent)]
    Structure(#[from] StructureError),
}


/// Everything that can go wrong when querying the dataplane for statistics
#[derive(Debug, Error)]
pub enum Error {
    /// The collaborator failed to connect or to execute the command
    #[error("the '{command}' command failed for {target}: {source}")]
    Transport {
        command: &'static str,
        target: String,
        #[source]
        source: TransportError,
    },

    /// The command returned no usable text
    #[error("the '{command}' command returned no data for {target}")]
    EmptyResponse { command: &'static str, target: String },

    /// The command output does not match the shape this crate understands
    #[error("the '{command}' command output for {target} failed analysis: {source}")]
    Structure {
        command: &'static str,
        target: String,
        #[source]
        source: StructureError,
    },

    /// The requested target is not one that this crate knows how to reach
    #[error("the '{target}' database is unsupported for '{command}'")]
    UnsupportedTarget { command: &'static str, target: String },
}
//
impl Error {
    /// Attach the command and target context to a response analysis failure
    pub(crate) fn from_response(command: &'static str,
                                target: &str,
                                error: ResponseError) -> Self {
        let target = target.to_owned();
        match error {
            ResponseError::Empty => Error::EmptyResponse { command, target },
            ResponseError::Structure(source) =>
                Error::Structure { command, target, source },
        }
    }
}
