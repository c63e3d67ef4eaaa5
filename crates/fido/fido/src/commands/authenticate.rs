//! U2F AUTHENTICATE command and its control byte

use bytes::{BufMut, Bytes, BytesMut};
use nexum_apdu_core::ApduCommand;
use nexum_apdu_core::command::ExpectedLength;

use crate::constants::{
    APPLICATION_LEN, CHALLENGE_LEN, MAX_KEY_HANDLE_LEN, authenticate_p1, cla, ins,
};
use crate::types::{ApplicationParameter, Challenge};
use crate::{Error, Result};

/// Control byte of an AUTHENTICATE request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AuthenticateMode {
    /// Only check that the key handle was issued by this authenticator
    CheckOnly,
    /// Require user presence and sign
    #[default]
    EnforceUserPresence,
    /// Sign without requiring user presence
    DontEnforceUserPresence,
}

impl AuthenticateMode {
    /// P1 value for this mode
    pub const fn p1(self) -> u8 {
        match self {
            Self::CheckOnly => authenticate_p1::CHECK_ONLY,
            Self::EnforceUserPresence => authenticate_p1::ENFORCE_USER_PRESENCE_AND_SIGN,
            Self::DontEnforceUserPresence => authenticate_p1::DONT_ENFORCE_USER_PRESENCE_AND_SIGN,
        }
    }
}

/// U2F AUTHENTICATE: `00 02 P1 00 Lc <challenge || application || L || key handle> 00`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateCommand {
    mode: AuthenticateMode,
    data: Bytes,
}

impl AuthenticateCommand {
    /// Build an authentication request for a previously registered key handle
    ///
    /// Fails with [`Error::KeyHandleTooLong`] if the payload would not fit a
    /// short APDU.
    pub fn new(
        mode: AuthenticateMode,
        challenge: &Challenge,
        application: &ApplicationParameter,
        key_handle: &[u8],
    ) -> Result<Self> {
        if key_handle.len() > MAX_KEY_HANDLE_LEN {
            return Err(Error::KeyHandleTooLong(key_handle.len()));
        }

        let mut data =
            BytesMut::with_capacity(CHALLENGE_LEN + APPLICATION_LEN + 1 + key_handle.len());
        data.put_slice(challenge);
        data.put_slice(application);
        data.put_u8(key_handle.len() as u8);
        data.put_slice(key_handle);

        Ok(Self {
            mode,
            data: data.freeze(),
        })
    }

    /// The requested mode
    pub const fn mode(&self) -> AuthenticateMode {
        self.mode
    }
}

impl ApduCommand for AuthenticateCommand {
    fn class(&self) -> u8 {
        cla::ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::AUTHENTICATE
    }

    fn p1(&self) -> u8 {
        self.mode.p1()
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }
}
