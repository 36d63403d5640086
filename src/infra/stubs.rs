use std::sync::atomic::{AtomicI64, Ordering};

use crate::{
    domain::transport::{ChatId, MessageId, ParseMode, SentMessage, TransportError},
    usecases::contracts::MessageTransport,
};

/// Transport that only logs; used by `--dry-run` to rehearse a broadcast.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    next_message_id: AtomicI64,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageTransport for DryRunTransport {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<SentMessage, TransportError> {
        let message_id = MessageId(self.next_message_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::info!(
            chat = %chat_id,
            message_id = %message_id,
            parse_mode = ?parse_mode,
            text,
            "dry-run send"
        );

        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        tracing::info!(
            chat = %chat_id,
            message_id = %message_id,
            text,
            "dry-run edit"
        );

        Ok(())
    }
}
