//! APDU response definitions
//!
//! This module provides types for working with APDU responses
//! according to ISO/IEC 7816-4.

pub mod error;
pub mod status;
pub mod utils;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use error::ResponseError;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Bytes,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: Bytes, status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// Create a success response
    pub const fn success(payload: Bytes) -> Self {
        Self {
            payload,
            status: status::common::SUCCESS,
        }
    }

    /// Create an error response from a status word
    pub fn error(status: impl Into<StatusWord>) -> Self {
        Self {
            payload: Bytes::new(),
            status: status.into(),
        }
    }

    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &Bytes) -> Result<Self, ResponseError> {
        let (status, payload) = utils::extract_status_and_payload(data)?;

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.len(),
            "Parsed APDU response"
        );

        // Slice the shared buffer rather than copying the payload out
        let payload = data.slice(..payload.len());
        Ok(Self { payload, status })
    }

    /// Get the response payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Consume the response, returning the payload bytes
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = ResponseError;

    fn try_from(data: &[u8]) -> Result<Self, ResponseError> {
        Self::from_bytes(&Bytes::copy_from_slice(data))
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = BytesMut::with_capacity(response.payload.len() + 2);
        buf.put_slice(&response.payload);
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_bytes() {
        let data = Bytes::from_static(&[0x01, 0x02, 0x03, 0x90, 0x00]);
        let resp = Response::from_bytes(&data).unwrap();
        assert_eq!(resp.payload(), &[0x01, 0x02, 0x03]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
        assert!(resp.is_success());

        let data = Bytes::from_static(&[0x6A, 0x82]);
        let resp = Response::from_bytes(&data).unwrap();
        assert!(resp.payload().is_empty());
        assert!(!resp.is_success());

        let data = Bytes::from_static(&[0x01]);
        assert!(Response::from_bytes(&data).is_err());
    }

    #[test]
    fn test_response_into_bytes() {
        let resp = Response::new(Bytes::from_static(b"U2F_V2"), (0x90, 0x00));
        let raw: Bytes = resp.into();
        assert_eq!(&raw[..], b"U2F_V2\x90\x00");
    }
}
