//! Core error type for all APDU operations
//!
//! Transport failures, malformed responses, rejected status words and buffer
//! overflows each have their own variant so callers can tell them apart
//! without inspecting messages.

use crate::response::error::ResponseError;
use crate::response::status::StatusWord;
use crate::transport::TransportError;

/// Result type for APDU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not complete an exchange
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card response could not be interpreted
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The card returned a non-success status word in strict mode
    #[error("Card returned status {0} ({desc})", desc = .0.description())]
    Status(StatusWord),

    /// Appending a response would exceed the destination buffer capacity
    #[error("Response buffer overflow: {required} bytes required, capacity is {capacity}")]
    BufferOverflow {
        /// Capacity of the destination buffer
        capacity: usize,
        /// Total length the write would have needed
        required: usize,
    },

    /// Command data does not fit a short Lc field
    #[error("Command data too long: {0} bytes (maximum 255)")]
    DataTooLong(usize),

    /// Invalid command length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },

    /// Other error with static message
    #[error("{0}")]
    Other(&'static str),
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new status error
    pub const fn status(sw1: u8, sw2: u8) -> Self {
        Self::Status(StatusWord::new(sw1, sw2))
    }

    /// Status word carried by this error, looking through context wrappers
    pub fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Context { source, .. } => source.status_word(),
            _ => None,
        }
    }

    /// Whether this error is a buffer overflow, looking through context wrappers
    pub fn is_buffer_overflow(&self) -> bool {
        match self {
            Self::BufferOverflow { .. } => true,
            Self::Context { source, .. } => source.is_buffer_overflow(),
            _ => false,
        }
    }

    /// Whether this error came from the transport, looking through context wrappers
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Response(_) => true,
            Self::Context { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// Extension trait for Result with APDU Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
