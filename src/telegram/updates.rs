use std::time::Duration;

use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::{
    domain::transport::{ChatId, TransportError, UserId},
    telegram::bot_api::{ApiChat, BotApiClient},
    usecases::contracts::{CommandFeed, IncomingCommand},
};

/// Extra time on top of the long-poll window before the HTTP request gives up.
const POLL_REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Long-polls `getUpdates` and yields text messages as operator commands.
///
/// Telegram only forgets an update once a later `getUpdates` carries an
/// offset past it; `acknowledge` sends that offset without waiting.
#[derive(Debug)]
pub struct UpdatePoller<'a> {
    client: &'a BotApiClient,
    offset: i64,
    confirmed: i64,
    timeout_secs: u64,
}

impl<'a> UpdatePoller<'a> {
    pub fn new(client: &'a BotApiClient, timeout_secs: u64) -> Self {
        Self {
            client,
            offset: 0,
            confirmed: 0,
            timeout_secs,
        }
    }

    fn pending_acknowledgement(&self) -> Option<GetUpdatesPayload> {
        (self.offset > self.confirmed).then_some(GetUpdatesPayload {
            offset: self.offset,
            timeout: 0,
            limit: Some(1),
            allowed_updates: ["message"],
        })
    }
}

impl CommandFeed for UpdatePoller<'_> {
    fn poll(&mut self) -> Result<Vec<IncomingCommand>, TransportError> {
        let payload = GetUpdatesPayload {
            offset: self.offset,
            timeout: self.timeout_secs,
            limit: None,
            allowed_updates: ["message"],
        };
        let request_timeout = Duration::from_secs(self.timeout_secs) + POLL_REQUEST_GRACE;
        let updates: Vec<ApiUpdate> =
            self.client
                .call("getUpdates", &payload, Some(request_timeout))?;
        self.confirmed = payload.offset;

        Ok(absorb_updates(&mut self.offset, updates))
    }

    fn acknowledge(&mut self) -> Result<(), TransportError> {
        let Some(payload) = self.pending_acknowledgement() else {
            return Ok(());
        };

        // Updates at or past the offset stay queued for the next poll.
        let _: Vec<IgnoredAny> =
            self.client
                .call("getUpdates", &payload, Some(POLL_REQUEST_GRACE))?;
        self.confirmed = payload.offset;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    offset: i64,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct ApiUpdate {
    update_id: i64,
    message: Option<ApiIncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiIncomingMessage {
    chat: ApiChat,
    from: Option<ApiUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
}

/// Advances `offset` past every update and keeps text messages with a sender.
fn absorb_updates(offset: &mut i64, updates: Vec<ApiUpdate>) -> Vec<IncomingCommand> {
    updates
        .into_iter()
        .filter_map(|update| {
            *offset = (*offset).max(update.update_id + 1);

            let message = update.message?;
            let from = message.from?;
            let text = message.text?;

            Some(IncomingCommand {
                chat_id: ChatId(message.chat.id),
                from: UserId(from.id),
                text,
            })
        })
        .collect()
}
