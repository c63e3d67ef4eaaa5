//! Constants used in FIDO U2F operations
//!
//! Values from the FIDO U2F NFC protocol and raw message formats.

/// Application identifier of the U2F applet
pub const FIDO_AID: [u8; 8] = [0xA0, 0x00, 0x00, 0x06, 0x47, 0x2F, 0x00, 0x01];

/// Version string returned by U2F authenticators on SELECT
pub const U2F_V2: &str = "U2F_V2";

/// U2F command classes
pub mod cla {
    /// ISO7816 command class
    pub const ISO7816: u8 = 0x00;
}

/// U2F instruction codes
pub mod ins {
    /// REGISTER command
    pub const REGISTER: u8 = 0x01;
    /// AUTHENTICATE command
    pub const AUTHENTICATE: u8 = 0x02;
}

/// Parameter values for REGISTER (P1)
pub mod register_p1 {
    /// Enforce user presence and sign
    pub const ENFORCE_USER_PRESENCE_AND_SIGN: u8 = 0x03;
}

/// Parameter values for AUTHENTICATE (P1)
pub mod authenticate_p1 {
    /// Enforce user presence and sign
    pub const ENFORCE_USER_PRESENCE_AND_SIGN: u8 = 0x03;
    /// Only check whether the key handle belongs to this authenticator
    pub const CHECK_ONLY: u8 = 0x07;
    /// Sign without requiring user presence
    pub const DONT_ENFORCE_USER_PRESENCE_AND_SIGN: u8 = 0x08;
}

/// Length of the challenge parameter
pub const CHALLENGE_LEN: usize = 32;

/// Length of the application parameter
pub const APPLICATION_LEN: usize = 32;

/// Reserved first byte of a registration response
pub const REGISTRATION_RESERVED_BYTE: u8 = 0x05;

/// Length of an uncompressed P-256 public key
pub const PUBLIC_KEY_LEN: usize = 65;

/// Largest key handle that keeps an AUTHENTICATE payload within a short Lc
pub const MAX_KEY_HANDLE_LEN: usize = 255 - CHALLENGE_LEN - APPLICATION_LEN - 1;

/// Response buffer size sufficient for a registration with a typical attestation certificate
pub const DEFAULT_RESPONSE_CAPACITY: usize = 2048;

/// Response buffer size for SELECT
pub const SELECT_RESPONSE_CAPACITY: usize = 256;
