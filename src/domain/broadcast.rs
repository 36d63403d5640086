use crate::domain::transport::{ChatId, TransportError, UserId};

/// Addressable endpoint that receives the broadcast body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipient {
    pub id: ChatId,
}

impl Recipient {
    pub fn new(id: i64) -> Self {
        Self { id: ChatId(id) }
    }
}

/// A validated broadcast: the body is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    body: String,
    origin_chat: ChatId,
    requested_by: UserId,
}

impl BroadcastRequest {
    /// Extracts the body from raw operator input.
    ///
    /// The command prefix (and a `@botname` mention glued to it) is stripped
    /// when present; input without the prefix is taken verbatim as the body.
    /// Returns `None` when nothing is left after trimming whitespace.
    pub fn parse(
        input: &str,
        command: &str,
        origin_chat: ChatId,
        requested_by: UserId,
    ) -> Option<Self> {
        let body = strip_command(input.trim(), command).trim();
        if body.is_empty() {
            return None;
        }

        Some(Self {
            body: body.to_owned(),
            origin_chat,
            requested_by,
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn origin_chat(&self) -> ChatId {
        self.origin_chat
    }

    pub fn requested_by(&self) -> UserId {
        self.requested_by
    }
}

/// Returns true when `text` invokes `command`, with or without a bot mention.
pub fn is_command(text: &str, command: &str) -> bool {
    command_remainder(text.trim_start(), command).is_some()
}

fn strip_command<'a>(input: &'a str, command: &str) -> &'a str {
    command_remainder(input, command).unwrap_or(input)
}

fn command_remainder<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(command)?;

    match rest.chars().next() {
        None => Some(rest),
        Some(ch) if ch.is_whitespace() => Some(rest),
        Some('@') => {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            Some(&rest[end..])
        }
        Some(_) => None,
    }
}

/// Result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub recipient: ChatId,
    pub succeeded: bool,
    pub error: Option<TransportError>,
}

impl DeliveryOutcome {
    pub fn delivered(recipient: ChatId) -> Self {
        Self {
            recipient,
            succeeded: true,
            error: None,
        }
    }

    pub fn failed(recipient: ChatId, error: TransportError) -> Self {
        Self {
            recipient,
            succeeded: false,
            error: Some(error),
        }
    }
}

/// Running counts for one broadcast; `processed == sent + failed <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastTally {
    total: usize,
    sent: usize,
    failed: usize,
    processed: usize,
}

impl BroadcastTally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            sent: 0,
            failed: 0,
            processed: 0,
        }
    }

    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        debug_assert!(self.processed < self.total, "tally overflow");

        if outcome.succeeded {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
        self.processed += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }

    /// A progress checkpoint is every `batch_size`-th recipient and the last one.
    pub fn is_checkpoint(&self, batch_size: usize) -> bool {
        if self.processed == 0 {
            return false;
        }

        (batch_size > 0 && self.processed % batch_size == 0) || self.is_complete()
    }

    pub fn progress(&self) -> Option<ProgressReport> {
        let percent = ratio_percent(self.processed, self.total)?;

        Some(ProgressReport {
            total: self.total,
            sent: self.sent,
            failed: self.failed,
            processed: self.processed,
            percent,
        })
    }

    /// `sent / total * 100`; `None` for an empty broadcast.
    pub fn success_rate(&self) -> Option<f64> {
        ratio_percent(self.sent, self.total)
    }
}

/// Read-only snapshot shown at a progress checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub processed: usize,
    pub percent: f64,
}

fn ratio_percent(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }

    Some(part as f64 / total as f64 * 100.0)
}
