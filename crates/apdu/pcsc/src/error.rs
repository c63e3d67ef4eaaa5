//! Error types for PC/SC transport

use nexum_apdu_core::transport::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Card was reset
    #[error("Card was reset")]
    CardReset,

    /// Card was removed
    #[error("Card was removed")]
    CardRemoved,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        match error {
            PcscError::NoCard(_) | PcscError::CardRemoved => Self::NoCard,
            PcscError::Pcsc(pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard) => Self::NoCard,
            PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::Pcsc(e) => Self::Driver(e as i32),
            PcscError::NoReadersAvailable | PcscError::ReaderNotFound(_) => Self::Connection,
            PcscError::CardReset => Self::Transmission,
            PcscError::Other(message) => Self::Other(message),
        }
    }
}
