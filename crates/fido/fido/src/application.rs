//! FIDO U2F application
//!
//! [`Fido`] wraps a [`CardExecutor`] and speaks the U2F NFC protocol through it:
//! applet selection, version check, registration and authentication. Every
//! command is sent with GET RESPONSE chaining and collects its response in a
//! buffer owned by the caller.

use nexum_apdu_core::prelude::*;
use tracing::{debug, info, warn};

use crate::commands::{AuthenticateCommand, AuthenticateMode, RegisterCommand};
use crate::constants::{FIDO_AID, SELECT_RESPONSE_CAPACITY};
use crate::types::{
    ApplicationParameter, AuthenticationOutcome, AuthenticationResponse, Challenge,
    RegistrationResponse, Version,
};
use crate::{Error, Result, ResultExt};

/// FIDO U2F application on top of an APDU executor
#[derive(Debug)]
pub struct Fido<T: CardTransport> {
    /// Command executor
    executor: CardExecutor<T>,
}

impl<T: CardTransport> Fido<T> {
    /// Create a FIDO application from an executor
    pub const fn new(executor: CardExecutor<T>) -> Self {
        Self { executor }
    }

    /// Create a FIDO application from a transport with default exchange options
    pub const fn from_transport(transport: T) -> Self {
        Self::new(CardExecutor::new(transport))
    }

    /// Get a reference to the executor
    pub const fn executor(&self) -> &CardExecutor<T> {
        &self.executor
    }

    /// Get a mutable reference to the executor
    pub const fn executor_mut(&mut self) -> &mut CardExecutor<T> {
        &mut self.executor
    }

    /// Take ownership of the executor
    pub fn into_executor(self) -> CardExecutor<T> {
        self.executor
    }

    /// SELECT the U2F applet
    ///
    /// The status word is returned as is; the response body is left in `buffer`.
    pub fn select(&mut self, field: FieldMode, buffer: &mut ResponseBuffer<'_>) -> Result<Exchange> {
        Ok(self.executor.select(&FIDO_AID, field, buffer)?)
    }

    /// Select the applet and read its version string
    ///
    /// The field is switched on for the selection and dropped afterwards.
    pub fn version(&mut self) -> Result<Version> {
        let mut storage = [0u8; SELECT_RESPONSE_CAPACITY];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let exchange = self
            .select(FieldMode::default(), &mut buffer)
            .context("Selecting U2F applet")?;
        if !exchange.is_success() {
            return Err(Error::CardStatus(exchange.status));
        }

        let version = Version::from_bytes(buffer.as_slice());
        if version.is_u2f_v2() {
            info!(%version, "U2F applet selected");
        } else {
            warn!(%version, "Unexpected U2F version");
        }
        Ok(version)
    }

    /// Send REGISTER and collect the whole response in `buffer`
    ///
    /// The applet must already be selected with the field kept on. The final
    /// status word is returned for the caller to classify.
    pub fn register(
        &mut self,
        command: &RegisterCommand,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        Ok(self.executor.transmit_chained(command, buffer)?)
    }

    /// Send AUTHENTICATE and collect the whole response in `buffer`
    ///
    /// The applet must already be selected with the field kept on. The final
    /// status word is returned for the caller to classify.
    pub fn authenticate(
        &mut self,
        command: &AuthenticateCommand,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        Ok(self.executor.transmit_chained(command, buffer)?)
    }

    /// Register a new credential for `application`
    ///
    /// Selects the applet, sends REGISTER and parses the response. `buffer`
    /// must be large enough for the attestation certificate. The field is
    /// dropped when this returns, whatever the outcome.
    pub fn enroll(
        &mut self,
        challenge: &Challenge,
        application: &ApplicationParameter,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<RegistrationResponse> {
        self.session(buffer, |fido, buffer| {
            let command = RegisterCommand::new(challenge, application);
            let exchange = fido.register(&command, buffer)?;
            if !exchange.is_success() {
                return Err(Error::CardStatus(exchange.status));
            }

            debug!(
                len = exchange.len,
                continuations = exchange.continuations,
                "Registration response received"
            );
            RegistrationResponse::parse(buffer.as_slice())
        })
    }

    /// Authenticate with a key handle from an earlier registration
    ///
    /// Selects the applet and sends AUTHENTICATE. In check-only mode the
    /// authenticator answers `69 85` for a key handle it issued, which is
    /// reported as [`AuthenticationOutcome::KeyHandleValid`]. Any other status
    /// besides `90 00` is [`Error::CardStatus`]. The field is dropped when this
    /// returns.
    pub fn sign(
        &mut self,
        command: &AuthenticateCommand,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<AuthenticationOutcome> {
        self.session(buffer, |fido, buffer| {
            let exchange = fido.authenticate(command, buffer)?;

            if command.mode() == AuthenticateMode::CheckOnly
                && exchange.status.is_conditions_not_satisfied()
            {
                return Ok(AuthenticationOutcome::KeyHandleValid);
            }
            if !exchange.is_success() {
                return Err(Error::CardStatus(exchange.status));
            }

            AuthenticationResponse::parse(buffer.as_slice()).map(AuthenticationOutcome::Signed)
        })
    }

    /// Run `operation` with the applet selected and the field on
    fn session<'b, R>(
        &mut self,
        buffer: &mut ResponseBuffer<'b>,
        operation: impl FnOnce(&mut Self, &mut ResponseBuffer<'b>) -> Result<R>,
    ) -> Result<R> {
        let selected = self
            .select(FieldMode::default().keep_on(), buffer)
            .context("Selecting U2F applet")?;

        let result = if selected.is_success() {
            debug!(version = %Version::from_bytes(buffer.as_slice()), "U2F applet selected");
            operation(self, buffer)
        } else {
            Err(Error::CardStatus(selected.status))
        };

        if let Err(e) = self.executor.drop_field() {
            warn!(error = %e, "Failed to drop field");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use nexum_apdu_core::transport::MockTransport;

    use super::*;
    use crate::constants::PUBLIC_KEY_LEN;

    fn select_ok() -> Bytes {
        Bytes::from_static(b"U2F_V2\x90\x00")
    }

    fn registration_body() -> Vec<u8> {
        let mut data = vec![0x05];
        data.extend_from_slice(&[0x04; PUBLIC_KEY_LEN]);
        data.push(2);
        data.extend_from_slice(&hex!("CAFE"));
        data.extend_from_slice(&hex!("3003020107"));
        data.extend_from_slice(&hex!("3006020101020102"));
        data
    }

    fn with_status(body: &[u8], sw: [u8; 2]) -> Bytes {
        let mut response = body.to_vec();
        response.extend_from_slice(&sw);
        Bytes::from(response)
    }

    #[test]
    fn test_version() {
        let mut fido = Fido::from_transport(MockTransport::new(vec![select_ok()]));

        let version = fido.version().unwrap();
        assert!(version.is_u2f_v2());

        let transport = fido.executor().transport();
        assert_eq!(transport.activations, 1);
        assert_eq!(transport.drops, 1);
    }

    #[test]
    fn test_version_applet_missing() {
        let transport = MockTransport::new(vec![Bytes::from_static(&hex!("6A82"))]);
        let mut fido = Fido::from_transport(transport);

        let err = fido.version().unwrap_err();
        assert!(matches!(err, Error::CardStatus(sw) if sw.is_file_not_found()));
    }

    #[test]
    fn test_enroll_chained() {
        let body = registration_body();
        let transport = MockTransport::new(vec![
            select_ok(),
            with_status(&body[..40], hex!("6100")),
            with_status(&body[40..], hex!("9000")),
        ]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 256];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let response = fido.enroll(&[0x11; 32], &[0x22; 32], &mut buffer).unwrap();
        assert_eq!(&response.key_handle[..], &hex!("CAFE"));
        assert_eq!(&response.certificate[..], &hex!("3003020107"));
        assert_eq!(&response.signature[..], &hex!("3006020101020102"));

        let transport = fido.executor().transport();
        assert_eq!(transport.transmissions(), 3);
        assert_eq!(&transport.commands[1][..5], &hex!("0001030040"));
        assert_eq!(&transport.commands[2][..], &hex!("00C0000000"));
        assert!(!transport.field_on);
        assert_eq!(transport.drops, 1);
    }

    #[test]
    fn test_enroll_rejected_by_card() {
        let transport = MockTransport::new(vec![select_ok(), Bytes::from_static(&hex!("6985"))]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 256];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let err = fido.enroll(&[0; 32], &[0; 32], &mut buffer).unwrap_err();
        assert_eq!(err.status_word(), Some(StatusWord::new(0x69, 0x85)));
        assert!(!fido.executor().transport().field_on);
    }

    #[test]
    fn test_enroll_requires_selection() {
        let transport = MockTransport::new(vec![Bytes::from_static(&hex!("6A82"))]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 256];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let err = fido.enroll(&[0; 32], &[0; 32], &mut buffer).unwrap_err();
        assert!(matches!(err, Error::CardStatus(_)));
        // REGISTER is never sent
        assert_eq!(fido.executor().transport().transmissions(), 1);
    }

    #[test]
    fn test_sign_check_only() {
        let transport = MockTransport::new(vec![select_ok(), Bytes::from_static(&hex!("6985"))]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 128];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let command =
            AuthenticateCommand::new(AuthenticateMode::CheckOnly, &[0; 32], &[0; 32], &[0xCA])
                .unwrap();
        let outcome = fido.sign(&command, &mut buffer).unwrap();
        assert_eq!(outcome, AuthenticationOutcome::KeyHandleValid);
    }

    #[test]
    fn test_sign_with_user_presence() {
        let transport = MockTransport::new(vec![
            select_ok(),
            with_status(&hex!("0100000007304402"), hex!("9000")),
        ]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 128];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let command = AuthenticateCommand::new(
            AuthenticateMode::EnforceUserPresence,
            &[0; 32],
            &[0; 32],
            &[0xCA],
        )
        .unwrap();
        let AuthenticationOutcome::Signed(response) = fido.sign(&command, &mut buffer).unwrap()
        else {
            panic!("expected a signature");
        };
        assert!(response.user_present());
        assert_eq!(response.counter, 7);
    }

    #[test]
    fn test_selection_failure_carries_context() {
        let mut transport = MockTransport::new(Vec::new());
        transport.push_failure();
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 64];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let err = fido.enroll(&[0; 32], &[0; 32], &mut buffer).unwrap_err();
        assert!(matches!(
            err,
            Error::Context { ref context, .. } if context == "Selecting U2F applet"
        ));
        assert!(err.status_word().is_none());
        assert!(!err.is_structural());

        let transport = fido.executor().transport();
        assert_eq!(transport.transmissions(), 1);
        assert!(!transport.field_on);
    }

    #[test]
    fn test_sign_wrong_key_handle() {
        let transport = MockTransport::new(vec![select_ok(), Bytes::from_static(&hex!("6A80"))]);
        let mut fido = Fido::from_transport(transport);
        let mut storage = [0u8; 128];
        let mut buffer = ResponseBuffer::new(&mut storage);

        let command =
            AuthenticateCommand::new(AuthenticateMode::CheckOnly, &[0; 32], &[0; 32], &[0xCA])
                .unwrap();
        let err = fido.sign(&command, &mut buffer).unwrap_err();
        assert!(matches!(err, Error::CardStatus(sw) if sw.is_wrong_data()));
    }
}
