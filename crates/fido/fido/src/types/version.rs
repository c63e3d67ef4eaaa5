use derive_more::{Deref, Display};

use crate::constants::U2F_V2;

/// Version string an authenticator returns when its applet is selected
#[derive(Debug, Clone, PartialEq, Eq, Display, Deref)]
pub struct Version(String);

impl Version {
    /// Read a version from a SELECT response body
    ///
    /// Invalid UTF-8 is replaced rather than rejected so unexpected versions can
    /// still be reported.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Whether this is the `U2F_V2` protocol version
    pub fn is_u2f_v2(&self) -> bool {
        self.0 == U2F_V2
    }
}
