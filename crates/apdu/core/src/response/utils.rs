//! Utility functions for APDU response handling

use tracing::debug;

use crate::response::error::ResponseError;
use crate::response::status::StatusWord;

/// Extract status word and payload from raw APDU response data
///
/// The status word is always the trailing two bytes; everything before it is
/// the payload, which may be empty.
///
/// # Errors
/// Returns an error if the data is too short to contain a valid status word.
pub fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    let len = data.len();
    if len < 2 {
        debug!("Response too short: {} bytes", len);
        return Err(ResponseError::Incomplete(len));
    }

    let (payload, sw) = data.split_at(len - 2);
    Ok((StatusWord::new(sw[0], sw[1]), payload))
}
