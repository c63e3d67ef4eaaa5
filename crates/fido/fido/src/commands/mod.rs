//! U2F command units
//!
//! Each command implements [`ApduCommand`](nexum_apdu_core::ApduCommand) and is
//! sent with GET RESPONSE chaining by [`Fido`](crate::Fido).

pub mod authenticate;
pub use authenticate::*;
pub mod register;
pub use register::*;
