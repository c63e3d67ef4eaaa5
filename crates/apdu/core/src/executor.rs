//! Executor for APDU command execution
//!
//! [`CardExecutor`] owns a transport together with the [`ExchangeOptions`] of
//! its session and offers single exchanges, chained exchanges and selection
//! on top of them.

use tracing::instrument;

use crate::{
    Result,
    buffer::ResponseBuffer,
    chaining,
    command::ApduCommand,
    exchange::{self, Exchange, ExchangeOptions},
    select::{self, FieldMode},
    transport::CardTransport,
};

/// Card executor combining a transport with per-session options
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// Options applied to every exchange of this session
    options: ExchangeOptions,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with default options
    pub const fn new(transport: T) -> Self {
        Self::with_options(transport, ExchangeOptions::new())
    }

    /// Create a new card executor with the given options
    pub const fn with_options(transport: T, options: ExchangeOptions) -> Self {
        Self { transport, options }
    }

    /// Get the session options
    pub const fn options(&self) -> &ExchangeOptions {
        &self.options
    }

    /// Replace the session options
    pub const fn set_options(&mut self, options: ExchangeOptions) {
        self.options = options;
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take ownership of the transport and return it
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send one command unit, applying the session status policy
    #[instrument(level = "trace", skip_all, fields(executor = std::any::type_name::<Self>()))]
    pub fn exchange<C: ApduCommand + ?Sized>(
        &mut self,
        command: &C,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        exchange::exchange(&mut self.transport, command, buffer, &self.options)
    }

    /// Send a command and follow any GET RESPONSE chain
    #[instrument(level = "trace", skip_all, fields(executor = std::any::type_name::<Self>()))]
    pub fn transmit_chained<C: ApduCommand + ?Sized>(
        &mut self,
        command: &C,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        chaining::transmit_chained(&mut self.transport, command, buffer, &self.options)
    }

    /// SELECT an application by identifier
    pub fn select(
        &mut self,
        aid: &[u8],
        field: FieldMode,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        select::select(&mut self.transport, aid, field, buffer, &self.options)
    }

    /// Energise the reader field
    pub fn activate_field(&mut self) -> Result<()> {
        self.transport.activate_field().map_err(Into::into)
    }

    /// Switch the reader field off
    pub fn drop_field(&mut self) -> Result<()> {
        self.transport.drop_field().map_err(Into::into)
    }

    /// Reset the transport connection
    pub fn reset(&mut self) -> Result<()> {
        self.transport.reset().map_err(Into::into)
    }
}
