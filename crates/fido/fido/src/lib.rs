//! FIDO U2F over NFC
//!
//! This crate drives a U2F authenticator through ISO/IEC 7816-4 APDUs on top of
//! `nexum-apdu-core`: selecting the applet, reading its version, registering a
//! credential and authenticating with it. Responses longer than a single frame
//! are reassembled with GET RESPONSE chaining into caller-owned buffers.
//!
//! The [`crypto`] module carries the AES-128-CBC and CMAC primitives used to
//! protect such exchanges, including the 8-byte CMAC derivation.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod application;
pub mod commands;
pub mod constants;
pub mod crypto;
mod error;
pub mod types;

pub use application::Fido;
pub use commands::{AuthenticateCommand, AuthenticateMode, RegisterCommand};
pub use error::{Error, Result, ResultExt};
pub use types::{
    ApplicationParameter, AuthenticationOutcome, AuthenticationResponse, Challenge,
    RegistrationResponse, Version,
};
