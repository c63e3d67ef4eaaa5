//! Subcommand implementations

mod fido;
pub use fido::*;
