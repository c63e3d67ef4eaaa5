//! Scripted transport for tests
//!
//! Enabled for this crate's own tests and, through the `mock` feature, for the
//! tests of crates built on top of it.

use std::collections::VecDeque;

use bytes::Bytes;

use super::{CardTransport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Data(Bytes),
    Fail,
}

/// Transport that replays scripted responses and records every command
#[derive(Debug, Clone)]
pub struct MockTransport {
    replies: VecDeque<Reply>,
    repeat: Option<Bytes>,
    /// Commands that were sent, in order
    pub commands: Vec<Bytes>,
    /// Whether a card is present
    pub connected: bool,
    /// Whether the field is currently on
    pub field_on: bool,
    /// Number of field activations
    pub activations: usize,
    /// Number of field drops
    pub drops: usize,
}

impl MockTransport {
    /// Create a mock transport that returns the given responses in order
    ///
    /// Once the responses run out every further transmission fails.
    pub fn new(responses: Vec<Bytes>) -> Self {
        Self {
            replies: responses.into_iter().map(Reply::Data).collect(),
            repeat: None,
            commands: Vec::new(),
            connected: true,
            field_on: false,
            activations: 0,
            drops: 0,
        }
    }

    /// Create a mock transport that always returns the given response
    pub fn with_response(response: Bytes) -> Self {
        Self::new(Vec::new()).repeating(response)
    }

    /// Create a mock transport that always returns success (90 00)
    pub fn with_success() -> Self {
        Self::with_response(Bytes::from_static(&[0x90, 0x00]))
    }

    /// Return `response` forever once the scripted responses are used up
    pub fn repeating(mut self, response: Bytes) -> Self {
        self.repeat = Some(response);
        self
    }

    /// Queue a response
    pub fn push_response(&mut self, response: impl Into<Bytes>) {
        self.replies.push_back(Reply::Data(response.into()));
    }

    /// Queue a transmission failure
    pub fn push_failure(&mut self) {
        self.replies.push_back(Reply::Fail);
    }

    /// Number of commands transmitted so far
    pub const fn transmissions(&self) -> usize {
        self.commands.len()
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::NoCard);
        }

        self.commands.push(Bytes::copy_from_slice(command));

        match self.replies.pop_front() {
            Some(Reply::Data(response)) => Ok(response),
            Some(Reply::Fail) => Err(TransportError::Transmission),
            None => self.repeat.clone().ok_or(TransportError::Transmission),
        }
    }

    fn activate_field(&mut self) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NoCard);
        }
        self.field_on = true;
        self.activations += 1;
        Ok(())
    }

    fn drop_field(&mut self) -> Result<(), TransportError> {
        self.field_on = false;
        self.drops += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        self.commands.clear();
        Ok(())
    }
}
