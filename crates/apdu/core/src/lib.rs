//! Core types for APDU (Application Protocol Data Unit) exchange
//!
//! This crate provides the foundational types for talking to smart cards with
//! short APDU commands according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! - [`Command`] builds the `CLA INS P1 P2 [Lc DATA] [Le]` wire encoding
//! - [`ResponseBuffer`] is a caller-owned, bounded destination for response bytes
//! - [`exchange`](exchange::exchange) sends exactly one command unit through a [`CardTransport`]
//! - [`ResponseChain`] reassembles responses delivered across `61 XX` GET RESPONSE chains
//! - [`select`](select::select) issues a SELECT by application identifier with field control
//! - [`CardExecutor`] bundles a transport with its [`ExchangeOptions`]
//!
//! Nothing in this crate keeps global state. Every call is parameterised by the
//! transport, buffer and options it is given.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod buffer;
pub mod chaining;
pub mod command;
pub mod exchange;
pub mod executor;
pub mod response;
pub mod select;
pub mod transport;

// Core error types
mod error;
pub use error::{Error, Result, ResultExt};

// Re-exports for common types
pub use buffer::ResponseBuffer;
pub use chaining::{ChainState, ResponseChain};
pub use command::{ApduCommand, Command};
pub use exchange::{Exchange, ExchangeOptions, StatusPolicy};
pub use executor::CardExecutor;
pub use response::status::StatusWord;
pub use response::{Response, utils};
pub use select::FieldMode;
pub use transport::CardTransport;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, CardExecutor, Command, Error, Exchange, ExchangeOptions, FieldMode,
        Response, ResponseBuffer, Result, ResultExt, StatusPolicy, command::ApduCommand,
        response::status::StatusWord, transport::CardTransport, transport::TransportError,
    };
}
