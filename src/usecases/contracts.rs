use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::domain::{
    broadcast::Recipient,
    transport::{ChatId, MessageId, ParseMode, SentMessage, TransportError, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSourceError {
    /// Backing store could not be reached or read.
    Unavailable(String),
    /// Backing store returned records that are not valid recipients.
    InvalidData(String),
}

impl std::fmt::Display for RecipientSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "recipient source unavailable: {details}"),
            Self::InvalidData(details) => write!(f, "recipient source data invalid: {details}"),
        }
    }
}

impl std::error::Error for RecipientSourceError {}

/// Repository of everyone a broadcast should reach.
pub trait RecipientSource {
    /// Returns all current recipients in delivery order.
    fn find_all(&self) -> Result<Vec<Recipient>, RecipientSourceError>;
}

/// Send and edit primitives of the messaging transport.
pub trait MessageTransport {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<SentMessage, TransportError>;

    fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError>;
}

impl<T: MessageTransport + ?Sized> MessageTransport for &T {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<SentMessage, TransportError> {
        (*self).send_message(chat_id, text, parse_mode)
    }

    fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        (*self).edit_message_text(chat_id, message_id, text)
    }
}

/// Blocks the caller between sends.
pub trait Pacer {
    fn pause(&self, delay: Duration);
}

/// A text command received from a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCommand {
    pub chat_id: ChatId,
    pub from: UserId,
    pub text: String,
}

/// Source of operator commands for the long-running bot mode.
pub trait CommandFeed {
    /// Waits for the next batch of commands; an empty batch means the poll timed out.
    fn poll(&mut self) -> Result<Vec<IncomingCommand>, TransportError>;

    /// Confirms every command polled so far so a restart does not see them again.
    fn acknowledge(&mut self) -> Result<(), TransportError>;
}

/// Cooperative cancellation shared between a signal handler and the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Underlying flag, for registration with OS signal handlers.
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.inner)
    }
}
