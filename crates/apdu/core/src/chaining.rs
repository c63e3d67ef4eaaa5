//! GET RESPONSE chaining
//!
//! Cards that cannot return a whole response at once answer `61 XX` and expect
//! the host to fetch the rest with GET RESPONSE. [`ResponseChain`] drives that
//! exchange sequence as an explicit state machine:
//!
//! ```text
//! Initial --(61 XX)--> Continuing --(61 XX)--> Continuing
//!    |                     |
//!    +--(other SW)--> Done <--(other SW)--+
//!    |                     |
//!    +--(error)---> Failed <--(error)-----+
//! ```
//!
//! Every exchange in a chain runs with [`StatusPolicy::PassThrough`], so only the
//! status word value decides whether the chain continues. The loop has no cap:
//! a card that keeps answering `61 XX` is stopped by the buffer capacity.

use derive_more::Display;
use tracing::{debug, trace, warn};

use crate::{
    Result,
    buffer::ResponseBuffer,
    command::{ApduCommand, Command},
    error::Error,
    exchange::{self, Exchange, ExchangeOptions, StatusPolicy},
    response::status::StatusWord,
    transport::CardTransport,
};

/// State of a response chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChainState {
    /// The initial command has not been sent
    Initial,
    /// The card reported more data and a GET RESPONSE is due
    Continuing,
    /// The card returned a terminal status word
    Done,
    /// An exchange failed; the buffer has been cleared
    Failed,
}

impl ChainState {
    /// Whether no further exchange will be made
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Response chaining controller for one command
#[derive(Debug)]
pub struct ResponseChain<'c, C: ApduCommand + ?Sized> {
    command: &'c C,
    options: ExchangeOptions,
    state: ChainState,
    status: Option<StatusWord>,
    continuations: usize,
}

impl<'c, C: ApduCommand + ?Sized> ResponseChain<'c, C> {
    /// Prepare a chain for `command`
    ///
    /// The status policy in `options` is replaced by pass-through; APDU logging
    /// is kept.
    pub const fn new(command: &'c C, options: &ExchangeOptions) -> Self {
        Self {
            command,
            options: options.with_status_policy(StatusPolicy::PassThrough),
            state: ChainState::Initial,
            status: None,
            continuations: 0,
        }
    }

    /// Current state
    pub const fn state(&self) -> ChainState {
        self.state
    }

    /// Last status word received, if any
    pub const fn status(&self) -> Option<StatusWord> {
        self.status
    }

    /// Number of GET RESPONSE commands sent so far
    pub const fn continuations(&self) -> usize {
        self.continuations
    }

    /// Perform the next exchange of the chain and return the new state
    ///
    /// The initial step clears `buffer` and writes from offset zero; each
    /// continuation appends at the current length. On any error the chain moves
    /// to [`ChainState::Failed`], the buffer is cleared and the error is
    /// returned. Stepping a finished chain does nothing.
    pub fn step<T: CardTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<ChainState> {
        let result = match self.state {
            ChainState::Initial => {
                buffer.clear();
                exchange::exchange(transport, self.command, buffer, &self.options)
            }
            ChainState::Continuing => {
                self.continuations += 1;
                trace!(
                    offset = buffer.len(),
                    remaining = buffer.remaining(),
                    continuation = self.continuations,
                    "Sending GET RESPONSE"
                );
                exchange::exchange(transport, &Command::get_response(), buffer, &self.options)
            }
            ChainState::Done | ChainState::Failed => return Ok(self.state),
        };

        match result {
            Ok(Exchange { status, .. }) => {
                self.status = Some(status);
                self.state = if status.is_more_data_available() {
                    ChainState::Continuing
                } else {
                    ChainState::Done
                };
                trace!(status = %status, state = %self.state, "Chain advanced");
                Ok(self.state)
            }
            Err(e) => {
                if e.is_buffer_overflow() {
                    warn!(
                        capacity = buffer.capacity(),
                        continuations = self.continuations,
                        "Response does not fit the buffer"
                    );
                } else {
                    debug!(error = %e, "Response chain failed");
                }
                self.state = ChainState::Failed;
                buffer.clear();
                Err(e)
            }
        }
    }

    /// Run the chain to completion
    ///
    /// Returns the final status word, the total accumulated length and the
    /// number of continuations. A terminal status other than `90 00` is not an
    /// error at this level.
    pub fn run<T: CardTransport + ?Sized>(
        mut self,
        transport: &mut T,
        buffer: &mut ResponseBuffer<'_>,
    ) -> Result<Exchange> {
        while !self.step(transport, buffer)?.is_finished() {}

        let status = self
            .status
            .ok_or(Error::other("response chain finished without a status word"))?;

        debug!(
            status = %status,
            len = buffer.len(),
            continuations = self.continuations,
            "Response chain complete"
        );

        Ok(Exchange {
            status,
            len: buffer.len(),
            continuations: self.continuations,
        })
    }
}

/// Send `command` and follow any GET RESPONSE chain into `buffer`
pub fn transmit_chained<T, C>(
    transport: &mut T,
    command: &C,
    buffer: &mut ResponseBuffer<'_>,
    options: &ExchangeOptions,
) -> Result<Exchange>
where
    T: CardTransport + ?Sized,
    C: ApduCommand + ?Sized,
{
    ResponseChain::new(command, options).run(transport, buffer)
}
