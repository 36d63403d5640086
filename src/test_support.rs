use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

use crate::{
    domain::{
        broadcast::Recipient,
        transport::{ChatId, MessageId, ParseMode, SentMessage, TransportError},
    },
    usecases::contracts::{MessageTransport, Pacer, RecipientSource, RecipientSourceError},
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub fn recipients(count: usize) -> Vec<Recipient> {
    (1..=count as i64).map(Recipient::new).collect()
}

pub struct StubRecipients {
    result: Result<Vec<Recipient>, RecipientSourceError>,
    pub calls: Cell<usize>,
}

impl StubRecipients {
    pub fn with_result(result: Result<Vec<Recipient>, RecipientSourceError>) -> Self {
        Self {
            result,
            calls: Cell::new(0),
        }
    }
}

impl RecipientSource for StubRecipients {
    fn find_all(&self) -> Result<Vec<Recipient>, RecipientSourceError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSend {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: ParseMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdit {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

#[derive(Default)]
pub struct RecordingTransport {
    failing_chats: Vec<ChatId>,
    fail_edits: bool,
    next_message_id: Cell<i64>,
    pub sends: RefCell<Vec<RecordedSend>>,
    pub edits: RefCell<Vec<RecordedEdit>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to these chats fail with a 403 rejection.
    pub fn failing_for(mut self, chats: &[i64]) -> Self {
        self.failing_chats = chats.iter().copied().map(ChatId).collect();
        self
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn sends_to(&self, chat_id: ChatId) -> Vec<RecordedSend> {
        self.sends
            .borrow()
            .iter()
            .filter(|send| send.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn sends_excluding(&self, chat_id: ChatId) -> Vec<RecordedSend> {
        self.sends
            .borrow()
            .iter()
            .filter(|send| send.chat_id != chat_id)
            .cloned()
            .collect()
    }
}

impl MessageTransport for RecordingTransport {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<SentMessage, TransportError> {
        self.sends.borrow_mut().push(RecordedSend {
            chat_id,
            text: text.to_owned(),
            parse_mode,
        });

        if self.failing_chats.contains(&chat_id) {
            return Err(TransportError::Rejected {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_owned(),
            });
        }

        let message_id = self.next_message_id.get() + 1;
        self.next_message_id.set(message_id);

        Ok(SentMessage {
            chat_id,
            message_id: MessageId(message_id),
        })
    }

    fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        self.edits.borrow_mut().push(RecordedEdit {
            chat_id,
            message_id,
            text: text.to_owned(),
        });

        if self.fail_edits {
            return Err(TransportError::Network("connection reset".to_owned()));
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPacer {
    pub pauses: RefCell<Vec<Duration>>,
}

impl Pacer for RecordingPacer {
    fn pause(&self, delay: Duration) {
        self.pauses.borrow_mut().push(delay);
    }
}

/// Fields of one tracing event, rendered as text.
pub type CapturedEvent = BTreeMap<String, String>;

/// Runs `body` with a subscriber that records every event emitted on this thread.
pub fn capture_events<T>(body: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);

    let result = tracing::subscriber::with_default(subscriber, body);
    let events = events.lock().expect("capture lock").clone();
    (result, events)
}

#[derive(Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldRecorder::default();
        event.record(&mut fields);
        self.events.lock().expect("capture lock").push(fields.0);
    }
}

#[derive(Default)]
struct FieldRecorder(CapturedEvent);

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0
            .insert(field.name().to_owned(), format!("{value:?}"));
    }
}
