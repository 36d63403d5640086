//! Blocking client for the Telegram Bot HTTP API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};

use crate::{
    domain::transport::{ChatId, MessageId, ParseMode, SentMessage, TransportError},
    infra::{
        config::{BotToken, TelegramConfig},
        error::AppError,
        secrets::redact_text,
    },
    usecases::contracts::MessageTransport,
};

#[derive(Debug)]
pub struct BotApiClient {
    http: Client,
    base_url: String,
    token: BotToken,
}

impl BotApiClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, AppError> {
        if config.bot_token.is_empty() {
            return Err(AppError::MissingBotToken);
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            token: config.bot_token.clone(),
        })
    }

    /// Invokes a Bot API method; `timeout` overrides the client default.
    pub(crate) fn call<P, R>(
        &self,
        method: &str,
        payload: &P,
        timeout: Option<Duration>,
    ) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token.expose(), method);
        let mut request = self.http.post(url).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().map_err(network_error)?;
        let body = response.text().map_err(network_error)?;

        decode_response(&body)
    }
}

impl MessageTransport for BotApiClient {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<SentMessage, TransportError> {
        let payload = SendMessagePayload {
            chat_id: chat_id.0,
            text,
            parse_mode: parse_mode.as_wire(),
        };
        let message: ApiMessage = self.call("sendMessage", &payload, None)?;

        Ok(SentMessage {
            chat_id: ChatId(message.chat.id),
            message_id: MessageId(message.message_id),
        })
    }

    fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        let payload = EditMessageTextPayload {
            chat_id: chat_id.0,
            message_id: message_id.0,
            text,
        };
        let _: IgnoredAny = self.call("editMessageText", &payload, None)?;

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextPayload<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i32>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message_id: i64,
    chat: ApiChat,
}

pub(crate) fn decode_response<R: DeserializeOwned>(body: &str) -> Result<R, TransportError> {
    let envelope: ApiEnvelope<R> = serde_json::from_str(body)
        .map_err(|error| TransportError::InvalidResponse(error.to_string()))?;

    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| TransportError::InvalidResponse("missing result field".to_owned()));
    }

    if let Some(retry_after_secs) = envelope.parameters.and_then(|params| params.retry_after) {
        return Err(TransportError::RateLimited { retry_after_secs });
    }

    Err(TransportError::Rejected {
        code: envelope.error_code.unwrap_or_default(),
        description: envelope
            .description
            .unwrap_or_else(|| "no description".to_owned()),
    })
}

fn network_error(error: reqwest::Error) -> TransportError {
    TransportError::Network(redact_text(&error.without_url().to_string()))
}
