//! U2F parameters and parsed response types

mod authentication;
pub use authentication::*;
mod registration;
pub use registration::*;
mod version;
pub use version::*;

use crate::constants::{APPLICATION_LEN, CHALLENGE_LEN};

/// Challenge parameter: SHA-256 of the client data
pub type Challenge = [u8; CHALLENGE_LEN];

/// Application parameter: SHA-256 of the application identity
pub type ApplicationParameter = [u8; APPLICATION_LEN];
