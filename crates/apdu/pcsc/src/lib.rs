//! PC/SC transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `nexum-apdu-core` using the PC/SC API for communication with smart cards
//! and contactless tokens. Connecting to the card stands in for activating the
//! field, and disconnecting with [`Disposition::UnpowerCard`](pcsc::Disposition)
//! drops it.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use nexum_apdu_core::{CardExecutor, FieldMode, ResponseBuffer};
//! use nexum_apdu_transport_pcsc::PcscDeviceManager;
//!
//! let manager = PcscDeviceManager::new()?;
//! let readers = manager.list_readers()?;
//! let transport = manager.open_reader(readers[0].name())?;
//! let mut executor = CardExecutor::new(transport);
//!
//! let mut storage = [0u8; 256];
//! let mut buffer = ResponseBuffer::new(&mut storage);
//! let aid = [0xA0, 0x00, 0x00, 0x06, 0x47, 0x2F, 0x00, 0x01];
//! let result = executor.select(&aid, FieldMode::default(), &mut buffer)?;
//! println!("{} -> {}", result.status, hex::encode(buffer.as_slice()));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;

pub use config::{ConnectStrategy, PcscConfig, ShareMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
