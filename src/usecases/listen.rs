//! Bot mode: wait for operator commands and dispatch broadcasts.

use std::time::Duration;

use crate::{
    domain::{broadcast::is_command, transport::UserId},
    usecases::{
        broadcast::{BroadcastCommand, BroadcastDispatcher},
        contracts::{CancelFlag, CommandFeed, IncomingCommand, Pacer},
    },
};

const LISTEN_NO_ADMINS: &str = "LISTEN_NO_ADMINS";
const LISTEN_POLL_FAILED: &str = "LISTEN_POLL_FAILED";
const LISTEN_ACK_FAILED: &str = "LISTEN_ACK_FAILED";
const LISTEN_UNAUTHORIZED_COMMAND: &str = "LISTEN_UNAUTHORIZED_COMMAND";
const LISTEN_BROADCAST_ENDED_EARLY: &str = "LISTEN_BROADCAST_ENDED_EARLY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenSettings {
    /// Accounts allowed to trigger a broadcast.
    pub admins: Vec<UserId>,
    /// Pause after a failed poll.
    pub poll_error_backoff: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            poll_error_backoff: Duration::from_secs(5),
        }
    }
}

/// Polls `feed` until `cancel` fires; returns how many broadcasts ran to a tally.
///
/// Each batch is acknowledged before any command in it runs, so a broadcast
/// interrupted by shutdown or a crash is not replayed on the next start. A
/// batch that cannot be acknowledged is dropped.
pub fn listen(
    feed: &mut dyn CommandFeed,
    dispatcher: &BroadcastDispatcher<'_>,
    pacer: &dyn Pacer,
    settings: &ListenSettings,
    cancel: &CancelFlag,
) -> usize {
    if settings.admins.is_empty() {
        tracing::warn!(
            code = LISTEN_NO_ADMINS,
            "no admin accounts configured; every broadcast command will be ignored"
        );
    }

    let mut dispatched = 0;

    while !cancel.is_cancelled() {
        let commands = match feed.poll() {
            Ok(commands) => commands,
            Err(error) => {
                tracing::warn!(
                    code = LISTEN_POLL_FAILED,
                    error = %error,
                    "failed to poll operator commands"
                );
                pacer.pause(settings.poll_error_backoff);
                continue;
            }
        };

        if commands.is_empty() {
            continue;
        }

        if let Err(error) = feed.acknowledge() {
            tracing::error!(
                code = LISTEN_ACK_FAILED,
                error = %error,
                dropped = commands.len(),
                "failed to confirm operator commands; batch dropped"
            );
            pacer.pause(settings.poll_error_backoff);
            continue;
        }

        for command in commands {
            if cancel.is_cancelled() {
                break;
            }

            if handle_command(command, dispatcher, settings, cancel) {
                dispatched += 1;
            }
        }
    }

    dispatched
}

fn handle_command(
    command: IncomingCommand,
    dispatcher: &BroadcastDispatcher<'_>,
    settings: &ListenSettings,
    cancel: &CancelFlag,
) -> bool {
    if !is_command(&command.text, &dispatcher.settings().command) {
        tracing::debug!(chat = %command.chat_id, "ignoring non-broadcast message");
        return false;
    }

    if !settings.admins.contains(&command.from) {
        tracing::warn!(
            code = LISTEN_UNAUTHORIZED_COMMAND,
            user = %command.from,
            chat = %command.chat_id,
            "broadcast command from non-admin ignored"
        );
        return false;
    }

    let request = BroadcastCommand {
        input: command.text,
        origin_chat: command.chat_id,
        requested_by: command.from,
    };

    match dispatcher.run(&request, cancel) {
        Ok(_) => true,
        Err(error) => {
            tracing::debug!(
                code = LISTEN_BROADCAST_ENDED_EARLY,
                error = %error,
                "broadcast ended before delivery"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::{
        domain::transport::{ChatId, TransportError},
        test_support::{recipients, RecordingPacer, RecordingTransport, StubRecipients},
        usecases::broadcast::BroadcastSettings,
    };

    const ADMIN: UserId = UserId(1_000);
    const ADMIN_CHAT: ChatId = ChatId(5_000);

    struct ScriptedFeed<'a> {
        batches: VecDeque<Result<Vec<IncomingCommand>, TransportError>>,
        cancel: CancelFlag,
        polls: usize,
        /// Recipient sends already made when each acknowledgement went out.
        acks: Vec<usize>,
        failing_ack: bool,
        watched: Option<&'a RecordingTransport>,
    }

    impl<'a> ScriptedFeed<'a> {
        fn new(
            batches: Vec<Result<Vec<IncomingCommand>, TransportError>>,
            cancel: &CancelFlag,
        ) -> Self {
            Self {
                batches: batches.into(),
                cancel: cancel.clone(),
                polls: 0,
                acks: Vec::new(),
                failing_ack: false,
                watched: None,
            }
        }

        fn watching(mut self, transport: &'a RecordingTransport) -> Self {
            self.watched = Some(transport);
            self
        }

        fn failing_ack(mut self) -> Self {
            self.failing_ack = true;
            self
        }
    }

    impl CommandFeed for ScriptedFeed<'_> {
        fn poll(&mut self) -> Result<Vec<IncomingCommand>, TransportError> {
            self.polls += 1;
            match self.batches.pop_front() {
                Some(batch) => batch,
                None => {
                    self.cancel.cancel();
                    Ok(Vec::new())
                }
            }
        }

        fn acknowledge(&mut self) -> Result<(), TransportError> {
            if self.failing_ack {
                return Err(TransportError::Network("connection reset".to_owned()));
            }

            let sent = self
                .watched
                .map(|transport| transport.sends_excluding(ADMIN_CHAT).len())
                .unwrap_or_default();
            self.acks.push(sent);
            Ok(())
        }
    }

    /// Cancels on the first pause, i.e. after the first recipient send.
    struct CancelOnPause(CancelFlag);

    impl Pacer for CancelOnPause {
        fn pause(&self, _: Duration) {
            self.0.cancel();
        }
    }

    fn incoming(from: UserId, text: &str) -> IncomingCommand {
        IncomingCommand {
            chat_id: ADMIN_CHAT,
            from,
            text: text.to_owned(),
        }
    }

    fn admin_settings() -> ListenSettings {
        ListenSettings {
            admins: vec![ADMIN],
            poll_error_backoff: Duration::from_secs(2),
        }
    }

    #[test]
    fn dispatches_admin_broadcast_commands() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(2)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![Ok(vec![incoming(ADMIN, "/broadcast hello")])],
            &cancel,
        );

        let dispatched = listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(dispatched, 1);
        assert_eq!(transport.sends_excluding(ADMIN_CHAT).len(), 2);
    }

    #[test]
    fn ignores_non_admins_and_unrelated_text() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(2)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![Ok(vec![
                incoming(UserId(7), "/broadcast spam"),
                incoming(ADMIN, "hello there"),
                incoming(ADMIN, "/broadcasting nope"),
            ])],
            &cancel,
        );

        let dispatched = listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(dispatched, 0);
        assert_eq!(source.calls.get(), 0);
        assert!(transport.sends.borrow().is_empty());
    }

    #[test]
    fn poll_errors_back_off_and_keep_listening() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(1)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![
                Err(TransportError::Network("timeout".to_owned())),
                Ok(vec![incoming(ADMIN, "/broadcast after outage")]),
            ],
            &cancel,
        );

        let dispatched = listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(dispatched, 1);
        assert_eq!(feed.polls, 3);
        assert_eq!(pacer.pauses.borrow()[0], Duration::from_secs(2));
    }

    #[test]
    fn usage_errors_are_not_counted_as_dispatched() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(1)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(vec![Ok(vec![incoming(ADMIN, "/broadcast")])], &cancel);

        let dispatched = listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(dispatched, 0);
        let replies = transport.sends_to(ADMIN_CHAT);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Usage"));
    }

    #[test]
    fn stops_immediately_when_already_cancelled() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let source = StubRecipients::with_result(Ok(recipients(1)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(Vec::new(), &cancel);

        assert_eq!(
            listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel),
            0
        );
        assert_eq!(feed.polls, 0);
    }

    #[test]
    fn acknowledges_batch_before_any_recipient_send() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(3)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![Ok(vec![incoming(ADMIN, "/broadcast hello")])],
            &cancel,
        )
        .watching(&transport);

        listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(feed.acks, vec![0]);
        assert_eq!(transport.sends_excluding(ADMIN_CHAT).len(), 3);
    }

    #[test]
    fn broadcast_cut_short_by_shutdown_was_already_acknowledged() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(5)));
        let transport = RecordingTransport::new();
        let pacer = CancelOnPause(cancel.clone());
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![Ok(vec![incoming(ADMIN, "/broadcast hello")])],
            &cancel,
        )
        .watching(&transport);

        listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(feed.polls, 1);
        assert_eq!(feed.acks, vec![0]);
        assert_eq!(transport.sends_excluding(ADMIN_CHAT).len(), 1);
    }

    #[test]
    fn unconfirmed_batch_is_dropped_not_dispatched() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(2)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(
            vec![Ok(vec![incoming(ADMIN, "/broadcast hello")])],
            &cancel,
        )
        .failing_ack();

        let dispatched = listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(dispatched, 0);
        assert_eq!(source.calls.get(), 0);
        assert!(transport.sends.borrow().is_empty());
        assert_eq!(*pacer.pauses.borrow(), vec![Duration::from_secs(2)]);
    }

    #[test]
    fn empty_polls_are_not_acknowledged() {
        let cancel = CancelFlag::new();
        let source = StubRecipients::with_result(Ok(recipients(1)));
        let transport = RecordingTransport::new();
        let pacer = RecordingPacer::default();
        let dispatcher =
            BroadcastDispatcher::new(&source, &transport, &pacer, BroadcastSettings::default());
        let mut feed = ScriptedFeed::new(vec![Ok(Vec::new()), Ok(Vec::new())], &cancel);

        listen(&mut feed, &dispatcher, &pacer, &admin_settings(), &cancel);

        assert_eq!(feed.polls, 3);
        assert!(feed.acks.is_empty());
    }
}
