//! Transport traits for APDU communication with cards
//!
//! A transport moves raw bytes to and from a card and owns the reader field.
//! It knows nothing about command structure, status words or chaining.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
use tracing::{debug, trace};

/// Trait for basic card transports
pub trait CardTransport: Send + Sync + fmt::Debug {
    /// Send raw APDU bytes to card and return response bytes
    ///
    /// This method should handle the low-level communication with the card
    /// but should not interpret the contents or handle protocol-specific
    /// operations like GET RESPONSE.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = ?hex::encode(command), "Transmitting raw command");
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => {
                trace!(response = ?hex::encode(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = ?e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit_raw
    /// This is the method that concrete implementations should override
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Energise the field and bring a card into a state where it accepts commands
    fn activate_field(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Switch the field off, ending the card session
    fn drop_field(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Check if the transport is connected to a physical card
    fn is_connected(&self) -> bool;

    /// Reset the transport connection
    fn reset(&mut self) -> Result<(), TransportError>;
}
