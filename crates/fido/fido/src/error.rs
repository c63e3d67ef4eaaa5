//! Error types for FIDO operations

use iso7816_tlv::TlvError;
use nexum_apdu_core::StatusWord;

use crate::constants::{MAX_KEY_HANDLE_LEN, REGISTRATION_RESERVED_BYTE};
use crate::crypto::CryptoError;

/// Result type for FIDO operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for FIDO operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport, buffer and exchange errors
    #[error(transparent)]
    Core(#[from] nexum_apdu_core::Error),

    /// The card answered with a status word other than 90 00
    #[error("Card returned status {0} ({desc})", desc = .0.description())]
    CardStatus(StatusWord),

    /// The registration response does not start with the reserved byte
    #[error(
        "Invalid registration response: reserved byte is {0:#04x}, expected {expected:#04x}",
        expected = REGISTRATION_RESERVED_BYTE
    )]
    InvalidReservedByte(u8),

    /// The response is truncated or otherwise malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(&'static str),

    /// The key handle does not fit an AUTHENTICATE command
    #[error("Key handle too long: {0} bytes (maximum {max})", max = MAX_KEY_HANDLE_LEN)]
    KeyHandleTooLong(usize),

    /// The certificate encoding could not be read
    #[error("TLV error: {0}")]
    Tlv(TlvError),

    /// Cipher or MAC failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the card sent something that is not a well-formed U2F response
    pub fn is_structural(&self) -> bool {
        match self {
            Self::InvalidReservedByte(_) | Self::InvalidResponse(_) | Self::Tlv(_) => true,
            Self::Context { source, .. } => source.is_structural(),
            _ => false,
        }
    }

    /// Status word reported by the card, if this error carries one
    pub fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::CardStatus(status) => Some(*status),
            Self::Core(e) => e.status_word(),
            Self::Context { source, .. } => source.status_word(),
            _ => None,
        }
    }
}

/// Extension trait for Result with FIDO Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
