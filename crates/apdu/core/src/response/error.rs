//! Error types specific to APDU responses

/// Error for APDU response processing
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Incomplete response (less than 2 bytes)
    #[error("Incomplete response: {0} bytes, status word needs 2")]
    Incomplete(usize),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(&'static str),
}

impl ResponseError {
    /// Create a parse error with a message
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }
}
