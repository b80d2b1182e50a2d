use thiserror::Error;
use tokio_util::codec::LinesCodecError;

use super::document::DocumentId;

/// Violations of the edit engine's invariants. Fatal for the connection that triggered them.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    #[error("delete start {begin} is beyond document length {len}")]
    DeleteOutOfRange { begin: usize, len: usize },

    #[error("request for document {request} pushed onto the queue of document {queue}")]
    ForeignRequest { request: DocumentId, queue: DocumentId },

    #[error("insert position {pos} plus {len} characters is not a representable position")]
    PositionOverflow { pos: usize, len: usize },

    #[error("edit would grow the document to {length} characters, the limit is {limit}")]
    TooLong { length: usize, limit: usize },
}

/// Recoverable failures reported back to the client as text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("File already exists.")]
    AlreadyExists(String),

    #[error("File does not exist, can't switch.")]
    NotFound(String),

    #[error("No document attached. Use new or switch first.")]
    NotAttached,

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// A command line that does not match the grammar.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty command line")]
    Empty,

    #[error("unknown verb '{0}'")]
    UnknownVerb(String),

    #[error("malformed arguments for '{0}'")]
    BadArguments(&'static str),

    #[error("raw command line contains non-ASCII characters")]
    NotAscii,
}

/// Ends a single connection's routine; the server keeps serving everyone else.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("line codec error: {0}")]
    Codec(#[from] LinesCodecError),

    #[error("payload is not valid UTF-8 after decoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
