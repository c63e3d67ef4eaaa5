use std::fmt;

use bytes::Bytes;

use crate::{Error, Result};

/// Bit of the user presence byte that reports a test of user presence
const USER_PRESENCE_FLAG: u8 = 0x01;

/// Authentication response message
///
/// ```text
/// user presence (1) | counter (4, big-endian) | signature
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// User presence byte
    pub user_presence: u8,
    /// Signature counter
    pub counter: u32,
    /// ECDSA signature over the authentication data
    pub signature: Bytes,
}

impl AuthenticationResponse {
    /// Parse an authentication response body
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (&user_presence, rest) = data
            .split_first()
            .ok_or(Error::InvalidResponse("empty authentication response"))?;
        let (counter, signature) = rest
            .split_first_chunk::<4>()
            .ok_or(Error::InvalidResponse("truncated counter"))?;
        if signature.is_empty() {
            return Err(Error::InvalidResponse("missing signature"));
        }

        Ok(Self {
            user_presence,
            counter: u32::from_be_bytes(*counter),
            signature: Bytes::copy_from_slice(signature),
        })
    }

    /// Whether the authenticator verified user presence
    pub const fn user_present(&self) -> bool {
        self.user_presence & USER_PRESENCE_FLAG != 0
    }
}

impl fmt::Display for AuthenticationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "User presence: {:#04x} ({})",
            self.user_presence,
            if self.user_present() { "present" } else { "not verified" }
        )?;
        writeln!(f, "Counter:       {}", self.counter)?;
        write!(f, "Signature:     {}", hex::encode_upper(&self.signature))
    }
}

/// Result of an AUTHENTICATE exchange the card accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// The authenticator signed the request
    Signed(AuthenticationResponse),
    /// Check-only request: the key handle belongs to this authenticator
    KeyHandleValid,
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_parse_authentication() {
        let response = AuthenticationResponse::parse(&hex!("01000001023045022100")).unwrap();
        assert!(response.user_present());
        assert_eq!(response.counter, 0x0102);
        assert_eq!(&response.signature[..], &hex!("3045022100"));
    }

    #[test]
    fn test_user_not_present() {
        let response = AuthenticationResponse::parse(&hex!("00FFFFFFFF30")).unwrap();
        assert!(!response.user_present());
        assert_eq!(response.counter, u32::MAX);
    }

    #[test]
    fn test_truncated_authentication() {
        let cases: [&[u8]; 4] = [&[], &hex!("01"), &hex!("01000000"), &hex!("0100000001")];
        for data in cases {
            let err = AuthenticationResponse::parse(data).unwrap_err();
            assert!(matches!(err, Error::InvalidResponse(_)));
        }
    }
}
