//! U2F REGISTER command

use bytes::{BufMut, Bytes, BytesMut};
use nexum_apdu_core::ApduCommand;
use nexum_apdu_core::command::ExpectedLength;

use crate::constants::{APPLICATION_LEN, CHALLENGE_LEN, cla, ins, register_p1};
use crate::types::{ApplicationParameter, Challenge};

/// U2F REGISTER: `00 01 03 00 40 <challenge || application> 00`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCommand {
    data: Bytes,
}

impl RegisterCommand {
    /// Build a registration request for `application`
    pub fn new(challenge: &Challenge, application: &ApplicationParameter) -> Self {
        let mut data = BytesMut::with_capacity(CHALLENGE_LEN + APPLICATION_LEN);
        data.put_slice(challenge);
        data.put_slice(application);
        Self {
            data: data.freeze(),
        }
    }
}

impl ApduCommand for RegisterCommand {
    fn class(&self) -> u8 {
        cla::ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::REGISTER
    }

    fn p1(&self) -> u8 {
        register_p1::ENFORCE_USER_PRESENCE_AND_SIGN
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

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_register_encoding() {
        let cmd = RegisterCommand::new(&[0x11; 32], &[0x22; 32]);
        let bytes = cmd.encode().unwrap();

        assert_eq!(bytes.len(), 4 + 1 + 64 + 1);
        assert_eq!(&bytes[..5], &hex!("0001030040"));
        assert_eq!(&bytes[5..37], &[0x11; 32]);
        assert_eq!(&bytes[37..69], &[0x22; 32]);
        assert_eq!(bytes[69], 0x00);
    }
}
