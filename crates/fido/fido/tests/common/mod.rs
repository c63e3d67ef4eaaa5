//! Simulated U2F authenticator for integration tests

use nexum_apdu_core::command::{INS_GET_RESPONSE, INS_SELECT};
use nexum_apdu_core::prelude::*;
use nexum_fido::constants::{FIDO_AID, REGISTRATION_RESERVED_BYTE, U2F_V2, authenticate_p1, ins};

/// Length of the certificate body the simulator attests with
pub const CERTIFICATE_BODY_LEN: usize = 300;

/// Key handles are the application parameter with every byte XORed with this
const KEY_HANDLE_MASK: u8 = 0x5A;

/// An NFC U2F authenticator that answers in chunks of `chunk_size` bytes
#[derive(Debug)]
pub struct SimulatedAuthenticator {
    /// Whether the U2F applet is installed
    pub installed: bool,
    /// Version returned on SELECT
    pub version: Vec<u8>,
    /// First byte of registration responses
    pub reserved_byte: u8,
    /// Largest response body sent in one frame
    pub chunk_size: usize,
    /// Signature counter
    pub counter: u32,
    /// Whether the field is on
    pub field_on: bool,
    /// Whether the applet is currently selected
    pub selected: bool,
    /// Every command received, in order
    pub log: Vec<Command>,
    /// Response bytes not yet sent
    pub pending: Vec<u8>,
}

impl Default for SimulatedAuthenticator {
    fn default() -> Self {
        Self {
            installed: true,
            version: U2F_V2.as_bytes().to_vec(),
            reserved_byte: REGISTRATION_RESERVED_BYTE,
            chunk_size: 256,
            counter: 0,
            field_on: false,
            selected: false,
            log: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl SimulatedAuthenticator {
    /// Create an authenticator that splits responses into `chunk_size` byte frames
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Number of GET RESPONSE commands received
    pub fn continuations(&self) -> usize {
        self.log
            .iter()
            .filter(|command| command.ins == INS_GET_RESPONSE)
            .count()
    }

    /// Key handle this authenticator issues for `application`
    pub fn key_handle_for(application: &[u8]) -> Vec<u8> {
        application.iter().map(|b| b ^ KEY_HANDLE_MASK).collect()
    }

    fn status(sw: u16) -> Bytes {
        Bytes::copy_from_slice(&sw.to_be_bytes())
    }

    /// Queue `body` and send its first frame
    fn respond(&mut self, body: Vec<u8>) -> Bytes {
        self.pending = body;
        self.next_frame()
    }

    fn next_frame(&mut self) -> Bytes {
        let take = self.pending.len().min(self.chunk_size);
        let mut frame: Vec<u8> = self.pending.drain(..take).collect();

        match self.pending.len() {
            0 => frame.extend_from_slice(&[0x90, 0x00]),
            remaining => frame.extend_from_slice(&[0x61, remaining.min(0xFF) as u8]),
        }
        Bytes::from(frame)
    }

    fn registration(&self, data: &[u8]) -> Vec<u8> {
        let application = &data[32..64];

        let mut body = vec![self.reserved_byte, 0x04];
        body.extend(application.iter().chain(application.iter()));
        let key_handle = Self::key_handle_for(application);
        body.push(key_handle.len() as u8);
        body.extend_from_slice(&key_handle);

        body.extend_from_slice(&[0x30, 0x82]);
        body.extend_from_slice(&(CERTIFICATE_BODY_LEN as u16).to_be_bytes());
        body.extend_from_slice(&[0x05, 0x00].repeat(CERTIFICATE_BODY_LEN / 2));

        body.extend_from_slice(&signature());
        body
    }

    fn authentication(&mut self, p1: u8, data: &[u8]) -> Bytes {
        if data.len() < 65 || data.len() != 65 + data[64] as usize {
            return Self::status(0x6700);
        }
        let application = &data[32..64];
        if data[65..] != Self::key_handle_for(application)[..] {
            return Self::status(0x6A80);
        }

        match p1 {
            authenticate_p1::CHECK_ONLY => Self::status(0x6985),
            authenticate_p1::ENFORCE_USER_PRESENCE_AND_SIGN
            | authenticate_p1::DONT_ENFORCE_USER_PRESENCE_AND_SIGN => {
                self.counter += 1;
                let presence = u8::from(p1 == authenticate_p1::ENFORCE_USER_PRESENCE_AND_SIGN);
                let mut body = vec![presence];
                body.extend_from_slice(&self.counter.to_be_bytes());
                body.extend_from_slice(&signature());
                self.respond(body)
            }
            _ => Self::status(0x6A86),
        }
    }
}

/// Stand-in DER signature
pub fn signature() -> Vec<u8> {
    let mut signature = vec![0x30, 0x44];
    signature.extend_from_slice(&[0x01; 0x44]);
    signature
}

impl CardTransport for SimulatedAuthenticator {
    fn do_transmit_raw(&mut self, raw: &[u8]) -> std::result::Result<Bytes, TransportError> {
        if !self.field_on {
            return Err(TransportError::Field);
        }

        let Ok(command) = Command::from_bytes(raw) else {
            return Ok(Self::status(0x6700));
        };
        self.log.push(command.clone());

        if command.ins != INS_GET_RESPONSE {
            self.pending.clear();
        }
        let data = command.data.as_deref().unwrap_or_default();

        let response = match command.ins {
            INS_SELECT if self.installed && data == &FIDO_AID[..] => {
                self.selected = true;
                let version = self.version.clone();
                self.respond(version)
            }
            INS_SELECT => {
                self.selected = false;
                Self::status(0x6A82)
            }
            INS_GET_RESPONSE if !self.pending.is_empty() => self.next_frame(),
            INS_GET_RESPONSE => Self::status(0x6985),
            ins::REGISTER | ins::AUTHENTICATE if !self.selected => Self::status(0x6D00),
            ins::REGISTER if data.len() != 64 => Self::status(0x6700),
            ins::REGISTER => {
                let body = self.registration(data);
                self.respond(body)
            }
            ins::AUTHENTICATE => self.authentication(command.p1, data),
            _ => Self::status(0x6D00),
        };
        Ok(response)
    }

    fn activate_field(&mut self) -> std::result::Result<(), TransportError> {
        self.field_on = true;
        Ok(())
    }

    fn drop_field(&mut self) -> std::result::Result<(), TransportError> {
        self.field_on = false;
        self.selected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn reset(&mut self) -> std::result::Result<(), TransportError> {
        self.drop_field()
    }
}
