//! Single APDU exchange
//!
//! [`exchange`] is the only place a command unit meets the transport. It sends
//! exactly one command, appends the response body to a [`ResponseBuffer`] and
//! reports the status word. It never retries.

use tracing::{Level, debug, info, instrument, warn};

use crate::{
    Result, buffer::ResponseBuffer, command::ApduCommand, error::Error,
    response::status::StatusWord, transport::CardTransport, utils,
};

/// How a single exchange treats a status word other than `90 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Fail with [`Error::Status`] and leave the buffer as it was
    #[default]
    Strict,
    /// Append the body and return the status for the caller to inspect
    PassThrough,
}

/// Per-session exchange configuration
///
/// Carried explicitly by each call so independent sessions never share
/// logging or status handling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExchangeOptions {
    /// Status word handling for single exchanges
    pub status_policy: StatusPolicy,
    /// Log every command and response as hex at debug level
    pub log_apdu: bool,
}

impl ExchangeOptions {
    /// Strict status handling with APDU logging off
    pub const fn new() -> Self {
        Self {
            status_policy: StatusPolicy::Strict,
            log_apdu: false,
        }
    }

    /// Set the status policy
    pub const fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }

    /// Set whether APDUs are logged
    pub const fn with_log_apdu(mut self, log_apdu: bool) -> Self {
        self.log_apdu = log_apdu;
        self
    }
}

/// Outcome of an exchange that reached the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    /// Final status word reported by the card
    pub status: StatusWord,
    /// Number of response bytes written to the buffer
    pub len: usize,
    /// Number of GET RESPONSE continuations that were issued
    pub continuations: usize,
}

impl Exchange {
    /// Check if the final status word is `90 00`
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-success status into [`Error::Status`]
    pub const fn check_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::Status(self.status))
        }
    }
}

/// Send one command unit and append the response body at the buffer's current length
///
/// Transport failures and malformed responses are always errors. A status word
/// other than `90 00` is an error only under [`StatusPolicy::Strict`], in which
/// case nothing is written. The returned [`Exchange::len`] counts the bytes
/// appended by this exchange alone.
#[instrument(level = "trace", skip_all, fields(ins = command.instruction()))]
pub fn exchange<T, C>(
    transport: &mut T,
    command: &C,
    buffer: &mut ResponseBuffer<'_>,
    options: &ExchangeOptions,
) -> Result<Exchange>
where
    T: CardTransport + ?Sized,
    C: ApduCommand + ?Sized,
{
    let raw = command.encode()?;
    if options.log_apdu {
        debug!(">>> {}", hex::encode_upper(&raw));
    }

    let response = transport.transmit_raw(&raw)?;
    if options.log_apdu {
        debug!("<<< {}", hex::encode_upper(&response));
    }

    let (status, payload) = utils::extract_status_and_payload(&response)?;
    log_status(status, payload.len());

    if options.status_policy == StatusPolicy::Strict && !status.is_success() {
        debug!(status = %status, "Rejecting non-success status");
        return Err(Error::Status(status));
    }

    buffer.extend_from_slice(payload)?;

    Ok(Exchange {
        status,
        len: payload.len(),
        continuations: 0,
    })
}

/// Report a status word at the level it warrants
fn log_status(status: StatusWord, payload_len: usize) {
    let description = status.description();
    match status.tracing_level() {
        level if level == Level::WARN => {
            warn!(status = %status, description, payload_len, "Exchange complete")
        }
        level if level == Level::INFO => {
            info!(status = %status, description, payload_len, "Exchange complete")
        }
        _ => debug!(status = %status, description, payload_len, "Exchange complete"),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use hex_literal::hex;

    use super::*;
    use crate::{command::Command, transport::MockTransport};

    #[test]
    fn test_exchange_appends_body() {
        let mut transport = MockTransport::new(vec![Bytes::from_static(&hex!("0102039000"))]);
        let mut storage = [0u8; 16];
        let mut buffer = ResponseBuffer::new(&mut storage);
        buffer.extend_from_slice(&[0xFF]).unwrap();

        let command = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0x00);
        let result =
            exchange(&mut transport, &command, &mut buffer, &ExchangeOptions::new()).unwrap();

        assert!(result.is_success());
        assert_eq!(result.len, 3);
        assert_eq!(buffer.as_slice(), &[0xFF, 0x01, 0x02, 0x03]);
        assert_eq!(transport.commands[0], command.to_bytes());
    }

    #[test]
    fn test_strict_rejects_status_without_writing() {
        let mut transport = MockTransport::new(vec![Bytes::from_static(&hex!("AABB6A82"))]);
        let mut storage = [0u8; 16];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let command = Command::new(0x00, 0xA4, 0x04, 0x00);
        let err = exchange(&mut transport, &command, &mut buffer, &ExchangeOptions::new())
            .unwrap_err();

        assert!(matches!(err, Error::Status(sw) if sw.to_u16() == 0x6A82));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_pass_through_reports_status() {
        let mut transport = MockTransport::new(vec![Bytes::from_static(&hex!("AABB6985"))]);
        let mut storage = [0u8; 16];
        let mut buffer = ResponseBuffer::new(&mut storage);
        let options = ExchangeOptions::new().with_status_policy(StatusPolicy::PassThrough);

        let command = Command::new(0x00, 0x01, 0x03, 0x00);
        let result = exchange(&mut transport, &command, &mut buffer, &options).unwrap();

        assert_eq!(result.status.to_u16(), 0x6985);
        assert_eq!(buffer.as_slice(), &hex!("AABB"));
        assert!(matches!(result.check_status(), Err(Error::Status(_))));
    }

    #[test]
    fn test_transport_failure_is_distinct() {
        let mut transport = MockTransport::new(Vec::new());
        transport.push_failure();
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);
        let options = ExchangeOptions::new().with_status_policy(StatusPolicy::PassThrough);

        let err = exchange(
            &mut transport,
            &Command::get_response(),
            &mut buffer,
            &options,
        )
        .unwrap_err();
        assert!(err.is_transport());
        assert!(err.status_word().is_none());
    }

    #[test]
    fn test_short_response_is_transport_level() {
        let mut transport = MockTransport::new(vec![Bytes::from_static(&[0x90])]);
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let err = exchange(
            &mut transport,
            &Command::get_response(),
            &mut buffer,
            &ExchangeOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Response(_)));
    }

    #[test]
    fn test_oversized_command_never_reaches_card() {
        let mut transport = MockTransport::with_success();
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let command = Command::new_with_data(0x00, 0x01, 0x03, 0x00, vec![0u8; 300]);
        let err = exchange(&mut transport, &command, &mut buffer, &ExchangeOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::DataTooLong(300)));
        assert_eq!(transport.transmissions(), 0);
    }

    #[test]
    fn test_log_apdu_does_not_change_result() {
        let mut transport = MockTransport::with_success();
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);
        let options = ExchangeOptions::new().with_log_apdu(true);

        let result =
            exchange(&mut transport, &Command::get_response(), &mut buffer, &options).unwrap();
        assert!(result.is_success());
        assert_eq!(result.len, 0);
    }
}
