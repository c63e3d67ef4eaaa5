//! APDU command definitions and traits
//!
//! This module provides types and traits for working with short APDU commands
//! according to ISO/IEC 7816-4. Extended length encoding is not supported, so
//! command data is limited to 255 bytes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Expected length type for APDU commands
pub type ExpectedLength = u8;

/// Largest payload a single Lc byte can describe
pub const MAX_SHORT_DATA_LEN: usize = 255;

/// Instruction byte for GET RESPONSE
pub const INS_GET_RESPONSE: u8 = 0xC0;

/// Instruction byte for SELECT
pub const INS_SELECT: u8 = 0xA4;

/// Core trait for APDU commands
pub trait ApduCommand {
    /// Command class (CLA)
    fn class(&self) -> u8;

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// First parameter (P1)
    fn p1(&self) -> u8;

    /// Second parameter (P2)
    fn p2(&self) -> u8;

    /// Command payload data (optional)
    fn data(&self) -> Option<&[u8]>;

    /// Expected response length (optional)
    fn expected_length(&self) -> Option<ExpectedLength>;

    /// Convert to raw APDU bytes
    ///
    /// The data length is written as a single Lc byte; call [`encode`](Self::encode)
    /// when the payload length has not been checked yet.
    fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.class());
        buffer.put_u8(self.instruction());
        buffer.put_u8(self.p1());
        buffer.put_u8(self.p2());

        // Add Lc and data if present
        if let Some(data) = self.data() {
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        // Add Le if present
        if let Some(le) = self.expected_length() {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    /// Check the payload fits a short Lc field and convert to raw APDU bytes
    fn encode(&self) -> Result<Bytes> {
        match self.data() {
            Some(data) if data.len() > MAX_SHORT_DATA_LEN => Err(Error::DataTooLong(data.len())),
            _ => Ok(self.to_bytes()),
        }
    }

    /// Calculate length of serialized command
    fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;

        if let Some(data) = self.data() {
            length += 1 + data.len();
        }

        if self.expected_length().is_some() {
            length += 1;
        }

        length
    }
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Create a new command with both data and expected length
    pub fn new_with_data_and_le<T: Into<Bytes>>(
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: T,
        le: ExpectedLength,
    ) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: Some(le),
        }
    }

    /// GET RESPONSE continuation: `00 C0 00 00 00`
    ///
    /// Le is always zero so the card returns as many bytes as it has, whatever
    /// length the previous `61 XX` status hinted.
    pub const fn get_response() -> Self {
        Self::new_with_le(0x00, INS_GET_RESPONSE, 0x00, 0x00, 0x00)
    }

    /// SELECT by application identifier: `00 A4 04 00 Lc AID 00`
    pub fn select_by_name<T: Into<Bytes>>(aid: T) -> Self {
        Self::new_with_data_and_le(0x00, INS_SELECT, 0x04, 0x00, aid, 0x00)
    }

    /// Parse a command from raw bytes
    ///
    /// A single byte after the header is read as Le, matching the encoding
    /// of commands without data.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);
        let body = &data[4..];

        match body.len() {
            0 => {}
            1 => command.le = Some(body[0]),
            _ => {
                let lc = body[0] as usize;
                let rest = &body[1..];
                if rest.len() < lc || rest.len() > lc + 1 {
                    return Err(Error::InvalidCommandLength(data.len()));
                }
                command.data = Some(Bytes::copy_from_slice(&rest[..lc]));
                if rest.len() == lc + 1 {
                    command.le = Some(rest[lc]);
                }
            }
        }

        Ok(command)
    }
}

impl ApduCommand for Command {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }
}
