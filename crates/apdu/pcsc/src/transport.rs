//! PC/SC transport implementation

use std::{ffi::CString, fmt};

use nexum_apdu_core::{Bytes, CardTransport, transport::TransportError};
use pcsc::{Card, Context, Disposition, MAX_BUFFER_SIZE};
use tracing::{debug, warn};

use crate::{config::PcscConfig, error::PcscError};

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: String,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a new PC/SC transport for the specified reader
    pub(crate) fn new(
        context: Context,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<Self, PcscError> {
        let mut transport = Self {
            context,
            card: None,
            reader_name: reader_name.to_string(),
            config,
        };

        if transport.config.connect_on_open
            && let Err(e) = transport.connect_card()
        {
            debug!(reader = %transport.reader_name, error = %e, "No card on open");
        }

        Ok(transport)
    }

    /// Try to connect to the card
    fn connect_card(&mut self) -> Result<(), PcscError> {
        if self.card.is_some() {
            return Ok(());
        }

        let reader_cstr = CString::new(self.reader_name.clone())
            .map_err(|_| PcscError::ReaderNotFound(self.reader_name.clone()))?;

        match self.context.connect(
            &reader_cstr,
            self.config.share_mode.into(),
            self.config.protocols,
        ) {
            Ok(card) => {
                debug!(reader = %self.reader_name, "Connected to card");
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(self.reader_name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Disconnect from the card with the given disposition
    fn disconnect_card(&mut self, disposition: Disposition) -> Result<(), PcscError> {
        match self.card.take() {
            Some(card) => card.disconnect(disposition).map_err(|(_, e)| e.into()),
            None => Ok(()),
        }
    }

    /// Get the ATR of the current card
    pub fn atr(&self) -> Result<Vec<u8>, PcscError> {
        self.card.as_ref().map_or_else(
            || Err(PcscError::NoCard(self.reader_name.clone())),
            |card| {
                card.get_attribute_owned(pcsc::Attribute::AtrString)
                    .map_err(Into::into)
            },
        )
    }

    /// Get the reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Check if the transport is connected to a card
    pub const fn has_card(&self) -> bool {
        self.card.is_some()
    }

    /// Transmit a command to the card
    fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        self.connect_card()?;

        match self.transmit_once(command) {
            Err(PcscError::CardReset) if self.config.auto_reconnect => {
                debug!(reader = %self.reader_name, "Card was reset, reconnecting");
                self.connect_card()?;
                self.transmit_once(command)
            }
            result => result,
        }
    }

    fn transmit_once(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let card = self
            .card
            .as_mut()
            .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))?;

        let mut response_buffer = [0u8; MAX_BUFFER_SIZE];

        match card.transmit(command, &mut response_buffer) {
            Ok(response) => Ok(Bytes::copy_from_slice(response)),
            Err(pcsc::Error::ResetCard) => {
                self.card = None;
                Err(PcscError::CardReset)
            }
            Err(pcsc::Error::RemovedCard) => {
                self.card = None;
                Err(PcscError::CardRemoved)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl CardTransport for PcscTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(TransportError::from)
    }

    fn activate_field(&mut self) -> Result<(), TransportError> {
        self.connect_card()?;
        if let Ok(atr) = self.atr() {
            debug!(atr = %hex::encode_upper(atr), "Field active");
        }
        Ok(())
    }

    fn drop_field(&mut self) -> Result<(), TransportError> {
        self.disconnect_card(Disposition::UnpowerCard)
            .map_err(TransportError::from)
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        if let Err(e) = self.disconnect_card(Disposition::ResetCard) {
            warn!(error = %e, "Failed to reset card");
        }

        self.connect_card().map_err(Into::into)
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        let _ = self.disconnect_card(Disposition::LeaveCard);
    }
}
