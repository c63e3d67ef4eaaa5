//! Application selection by identifier

use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    Result, ResultExt,
    buffer::ResponseBuffer,
    chaining::ResponseChain,
    command::Command,
    exchange::{Exchange, ExchangeOptions},
    transport::CardTransport,
};

/// Field handling around a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMode {
    /// Energise the field before sending SELECT
    pub activate: bool,
    /// Leave the field on after a successful selection
    pub keep_on: bool,
}

impl FieldMode {
    /// Create a field mode
    pub const fn new(activate: bool, keep_on: bool) -> Self {
        Self { activate, keep_on }
    }

    /// Leave the field on afterwards
    pub const fn keep_on(mut self) -> Self {
        self.keep_on = true;
        self
    }
}

impl Default for FieldMode {
    /// Activate, select, drop
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// SELECT the application `aid` and collect its response in `buffer`
///
/// Success is decided by the returned status word alone; the response body is
/// not interpreted. The field is dropped afterwards unless `field.keep_on` is
/// set, and always dropped when the selection fails.
pub fn select<T: CardTransport + ?Sized>(
    transport: &mut T,
    aid: &[u8],
    field: FieldMode,
    buffer: &mut ResponseBuffer<'_>,
    options: &ExchangeOptions,
) -> Result<Exchange> {
    debug!(aid = %hex::encode_upper(aid), ?field, "Selecting application");

    if field.activate {
        transport.activate_field().context("Activating field")?;
    }

    let command = Command::select_by_name(Bytes::copy_from_slice(aid));
    let result = ResponseChain::new(&command, options).run(transport, buffer);

    if (!field.keep_on || result.is_err())
        && let Err(e) = transport.drop_field()
    {
        warn!(error = %e, "Failed to drop field after selection");
    }

    result
}
