//! Broadcast dispatcher: delivers one message body to every recipient.
//!
//! Delivery is strictly sequential with a fixed pause after each send, which
//! keeps the outbound rate under the transport's limits. Progress is shown to
//! the operator by editing a single status message in place.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::{
    domain::{
        broadcast::{BroadcastRequest, BroadcastTally, DeliveryOutcome, Recipient},
        report,
        transport::{ChatId, ParseMode, SentMessage, TransportError, UserId},
    },
    usecases::contracts::{
        CancelFlag, MessageTransport, Pacer, RecipientSource, RecipientSourceError,
    },
};

pub const DEFAULT_COMMAND: &str = "/broadcast";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_PROGRESS_BATCH_SIZE: usize = 10;

const BROADCAST_USAGE_REJECTED: &str = "BROADCAST_USAGE_REJECTED";
const BROADCAST_RECIPIENTS_UNAVAILABLE: &str = "BROADCAST_RECIPIENTS_UNAVAILABLE";
const BROADCAST_NO_RECIPIENTS: &str = "BROADCAST_NO_RECIPIENTS";
const BROADCAST_REPLY_FAILED: &str = "BROADCAST_REPLY_FAILED";
const BROADCAST_STATUS_SEND_FAILED: &str = "BROADCAST_STATUS_SEND_FAILED";
const BROADCAST_DELIVERY_FAILED: &str = "BROADCAST_DELIVERY_FAILED";
const BROADCAST_PROGRESS_EDIT_FAILED: &str = "BROADCAST_PROGRESS_EDIT_FAILED";
const BROADCAST_SUMMARY_EDIT_FAILED: &str = "BROADCAST_SUMMARY_EDIT_FAILED";
const BROADCAST_CANCELLED: &str = "BROADCAST_CANCELLED";
const BROADCAST_COMPLETED: &str = "BROADCAST_COMPLETED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSettings {
    /// Command prefix stripped from operator input.
    pub command: String,
    /// Pause after every send attempt.
    pub send_delay: Duration,
    /// Status message is refreshed every this many recipients.
    pub progress_batch_size: usize,
    /// Skip the pause after the final recipient.
    pub skip_trailing_delay: bool,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_owned(),
            send_delay: DEFAULT_SEND_DELAY,
            progress_batch_size: DEFAULT_PROGRESS_BATCH_SIZE,
            skip_trailing_delay: false,
        }
    }
}

impl BroadcastSettings {
    fn batch_size(&self) -> usize {
        match self.progress_batch_size {
            0 => DEFAULT_PROGRESS_BATCH_SIZE,
            value => value,
        }
    }
}

/// Raw operator input as received from the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastCommand {
    pub input: String,
    pub origin_chat: ChatId,
    pub requested_by: UserId,
}

/// Reasons a broadcast ends before the delivery loop starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("broadcast message body is empty")]
    Usage,
    #[error("failed to retrieve recipients: {0}")]
    Retrieval(#[source] RecipientSourceError),
    #[error("no recipients to broadcast to")]
    NoRecipients,
    #[error("failed to post initial status message: {0}")]
    StatusMessage(#[source] TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub tally: BroadcastTally,
    pub failures: Vec<DeliveryOutcome>,
    pub cancelled: bool,
}

pub struct BroadcastDispatcher<'a> {
    recipients: &'a dyn RecipientSource,
    transport: &'a dyn MessageTransport,
    pacer: &'a dyn Pacer,
    settings: BroadcastSettings,
}

impl<'a> BroadcastDispatcher<'a> {
    pub fn new(
        recipients: &'a dyn RecipientSource,
        transport: &'a dyn MessageTransport,
        pacer: &'a dyn Pacer,
        settings: BroadcastSettings,
    ) -> Self {
        Self {
            recipients,
            transport,
            pacer,
            settings,
        }
    }

    pub fn settings(&self) -> &BroadcastSettings {
        &self.settings
    }

    /// Runs one broadcast end to end.
    ///
    /// Early terminations are reported to the origin chat before the error is
    /// returned. Once the status message exists, every outcome (including a
    /// cancelled run) yields a tally.
    pub fn run(
        &self,
        command: &BroadcastCommand,
        cancel: &CancelFlag,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let started = Instant::now();

        let Some(request) = BroadcastRequest::parse(
            &command.input,
            &self.settings.command,
            command.origin_chat,
            command.requested_by,
        ) else {
            tracing::info!(
                code = BROADCAST_USAGE_REJECTED,
                admin = %command.requested_by,
                "broadcast rejected: empty message body"
            );
            self.reply(command.origin_chat, &report::usage_text(&self.settings.command));
            return Err(BroadcastError::Usage);
        };

        let recipients = match self.recipients.find_all() {
            Ok(recipients) => recipients,
            Err(error) => {
                tracing::error!(
                    code = BROADCAST_RECIPIENTS_UNAVAILABLE,
                    error = %error,
                    "failed to retrieve recipients for broadcast"
                );
                self.reply(request.origin_chat(), report::retrieval_error_text());
                return Err(BroadcastError::Retrieval(error));
            }
        };

        if recipients.is_empty() {
            tracing::info!(
                code = BROADCAST_NO_RECIPIENTS,
                admin = %request.requested_by(),
                "broadcast skipped: no recipients"
            );
            self.reply(request.origin_chat(), report::no_recipients_text());
            return Err(BroadcastError::NoRecipients);
        }

        let status = self
            .transport
            .send_message(
                request.origin_chat(),
                &report::starting_text(recipients.len()),
                ParseMode::Plain,
            )
            .map_err(|error| {
                tracing::error!(
                    code = BROADCAST_STATUS_SEND_FAILED,
                    error = %error,
                    "failed to post initial broadcast status message"
                );
                BroadcastError::StatusMessage(error)
            })?;

        let outcome = self.deliver(&request, &recipients, status, cancel);

        let summary = if outcome.cancelled {
            report::cancelled_text(&outcome.tally)
        } else {
            report::completion_text(&outcome.tally)
        };
        self.edit_status(status, &summary, BROADCAST_SUMMARY_EDIT_FAILED);

        let code = if outcome.cancelled {
            BROADCAST_CANCELLED
        } else {
            BROADCAST_COMPLETED
        };
        tracing::info!(
            code,
            total = outcome.tally.total(),
            sent = outcome.tally.sent(),
            failed = outcome.tally.failed(),
            processed = outcome.tally.processed(),
            cancelled = outcome.cancelled,
            admin = %request.requested_by(),
            origin_chat = %request.origin_chat(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "broadcast finished"
        );

        Ok(outcome)
    }

    fn deliver(
        &self,
        request: &BroadcastRequest,
        recipients: &[Recipient],
        status: SentMessage,
        cancel: &CancelFlag,
    ) -> BroadcastOutcome {
        let batch_size = self.settings.batch_size();
        let mut tally = BroadcastTally::new(recipients.len());
        let mut failures = Vec::new();
        let mut cancelled = false;

        for (index, recipient) in recipients.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    code = BROADCAST_CANCELLED,
                    processed = tally.processed(),
                    total = tally.total(),
                    "broadcast cancelled between recipients"
                );
                cancelled = true;
                break;
            }

            let outcome = match self.transport.send_message(
                recipient.id,
                request.body(),
                ParseMode::Html,
            ) {
                Ok(_) => DeliveryOutcome::delivered(recipient.id),
                Err(error) => {
                    tracing::warn!(
                        code = BROADCAST_DELIVERY_FAILED,
                        recipient = %recipient.id,
                        error_code = error.code(),
                        error = %error,
                        "failed to deliver broadcast message"
                    );
                    DeliveryOutcome::failed(recipient.id, error)
                }
            };

            tally.record(&outcome);
            if !outcome.succeeded {
                failures.push(outcome);
            }

            if tally.is_checkpoint(batch_size) {
                if let Some(progress) = tally.progress() {
                    self.edit_status(
                        status,
                        &report::progress_text(&progress),
                        BROADCAST_PROGRESS_EDIT_FAILED,
                    );
                }
            }

            let is_last = index + 1 == recipients.len();
            if !(is_last && self.settings.skip_trailing_delay) {
                self.pacer.pause(self.settings.send_delay);
            }
        }

        BroadcastOutcome {
            tally,
            failures,
            cancelled,
        }
    }

    fn edit_status(&self, status: SentMessage, text: &str, failure_code: &'static str) {
        if let Err(error) =
            self.transport
                .edit_message_text(status.chat_id, status.message_id, text)
        {
            tracing::warn!(
                code = failure_code,
                chat = %status.chat_id,
                message_id = %status.message_id,
                error = %error,
                "failed to update broadcast status message"
            );
        }
    }

    fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(error) = self.transport.send_message(chat_id, text, ParseMode::Plain) {
            tracing::error!(
                code = BROADCAST_REPLY_FAILED,
                chat = %chat_id,
                error = %error,
                "failed to send broadcast reply to operator"
            );
        }
    }
}
