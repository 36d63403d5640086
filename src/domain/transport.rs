use std::fmt;

use thiserror::Error;

/// Transport-level chat address (private chat, group, or channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account that issued an operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the transport should interpret message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Rich text with HTML tags passed through untouched.
    Html,
    #[default]
    Plain,
}

impl ParseMode {
    /// Wire value for the Bot API `parse_mode` field, if any.
    pub fn as_wire(self) -> Option<&'static str> {
        match self {
            Self::Html => Some("HTML"),
            Self::Plain => None,
        }
    }
}

/// Handle to a message the transport accepted; used for in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport rejected request ({code}): {description}")]
    Rejected { code: i32, description: String },
    #[error("transport rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("transport network failure: {0}")]
    Network(String),
    #[error("transport returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Stable log code for this failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "TRANSPORT_REJECTED",
            Self::RateLimited { .. } => "TRANSPORT_RATE_LIMITED",
            Self::Network(_) => "TRANSPORT_NETWORK",
            Self::InvalidResponse(_) => "TRANSPORT_INVALID_RESPONSE",
        }
    }
}
