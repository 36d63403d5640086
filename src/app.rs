use anyhow::{bail, Result};

use crate::{
    cli::{Cli, Command},
    domain::{
        self,
        transport::{ChatId, UserId},
    },
    infra::{
        self, config::AppConfig, error::AppError, pacing::ThreadPacer,
        recipients_file::FileRecipientSource, stubs::DryRunTransport,
    },
    telegram::{self, BotApiClient, UpdatePoller},
    usecases::{
        self, bootstrap,
        broadcast::{BroadcastCommand, BroadcastDispatcher, BroadcastError, BroadcastOutcome},
        contracts::{CancelFlag, MessageTransport},
        listen::listen,
    },
};

const LISTEN_STARTED: &str = "LISTEN_STARTED";
const LISTEN_STOPPED: &str = "LISTEN_STOPPED";

pub fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        domain = domain::module_name(),
        telegram = telegram::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let cancel = CancelFlag::new();
    infra::shutdown::install(&cancel)?;

    match (cli.command_or_default(), cli.dry_run) {
        (
            Command::Send {
                message,
                chat,
                operator,
            },
            true,
        ) => {
            let transport = DryRunTransport::new();
            send(&context.config, &transport, &message, chat, operator, &cancel)
        }
        (
            Command::Send {
                message,
                chat,
                operator,
            },
            false,
        ) => {
            let client = BotApiClient::new(&context.config.telegram)?;
            send(&context.config, &client, &message, chat, operator, &cancel)
        }
        (Command::Listen, true) => {
            bail!("listen needs the Telegram transport to receive commands; drop --dry-run")
        }
        (Command::Listen, false) => {
            let client = BotApiClient::new(&context.config.telegram)?;
            run_listener(&context.config, &client, &cancel);
            Ok(())
        }
    }
}

fn send(
    config: &AppConfig,
    transport: &dyn MessageTransport,
    message: &[String],
    chat: Option<i64>,
    operator: Option<i64>,
    cancel: &CancelFlag,
) -> Result<()> {
    let origin = chat
        .or(config.operator.chat_id)
        .ok_or(AppError::MissingOperatorChat)?;

    let recipients = FileRecipientSource::new(&config.recipients.file);
    let pacer = ThreadPacer;
    let dispatcher = BroadcastDispatcher::new(
        &recipients,
        transport,
        &pacer,
        bootstrap::broadcast_settings(&config.broadcast),
    );

    let command = BroadcastCommand {
        input: message.join(" "),
        origin_chat: ChatId(origin),
        requested_by: UserId(operator.unwrap_or(origin)),
    };

    match dispatcher.run(&command, cancel) {
        Ok(outcome) => {
            for line in summary_lines(&outcome) {
                println!("{line}");
            }
            Ok(())
        }
        Err(error @ BroadcastError::StatusMessage(_)) => Err(error.into()),
        Err(error) => {
            eprintln!("broadcast not started: {error}");
            Ok(())
        }
    }
}

fn run_listener(config: &AppConfig, client: &BotApiClient, cancel: &CancelFlag) {
    let recipients = FileRecipientSource::new(&config.recipients.file);
    let pacer = ThreadPacer;
    let dispatcher = BroadcastDispatcher::new(
        &recipients,
        client,
        &pacer,
        bootstrap::broadcast_settings(&config.broadcast),
    );
    let settings = bootstrap::listen_settings(&config.operator);
    let mut feed = UpdatePoller::new(client, config.telegram.poll_timeout_secs);

    tracing::info!(
        code = LISTEN_STARTED,
        admins = settings.admins.len(),
        recipients_file = %recipients.path().display(),
        "listening for broadcast commands"
    );

    let dispatched = listen(&mut feed, &dispatcher, &pacer, &settings, cancel);

    tracing::info!(code = LISTEN_STOPPED, dispatched, "listener stopped");
}

fn summary_lines(outcome: &BroadcastOutcome) -> Vec<String> {
    let tally = &outcome.tally;
    let mut lines = vec![format!(
        "{}: total={} sent={} failed={} processed={}",
        if outcome.cancelled {
            "cancelled"
        } else {
            "completed"
        },
        tally.total(),
        tally.sent(),
        tally.failed(),
        tally.processed(),
    )];

    lines.extend(outcome.failures.iter().map(|failure| {
        let reason = failure
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown error".to_owned());
        format!("failed {}: {}", failure.recipient, reason)
    }));

    lines
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{
        domain::{
            broadcast::{BroadcastTally, DeliveryOutcome},
            transport::TransportError,
        },
        test_support::RecordingTransport,
    };

    fn config_with_recipients(file: &tempfile::NamedTempFile) -> AppConfig {
        let mut config = AppConfig::default();
        config.recipients.file = file.path().to_path_buf();
        config.broadcast.send_delay_ms = 0;
        config.operator.chat_id = Some(777);
        config
    }

    #[test]
    fn summary_lines_list_failed_recipients() {
        let mut tally = BroadcastTally::new(2);
        let failure = DeliveryOutcome::failed(
            ChatId(5),
            TransportError::Rejected {
                code: 400,
                description: "Bad Request: chat not found".to_owned(),
            },
        );
        tally.record(&DeliveryOutcome::delivered(ChatId(4)));
        tally.record(&failure);

        let lines = summary_lines(&BroadcastOutcome {
            tally,
            failures: vec![failure],
            cancelled: false,
        });

        assert_eq!(lines[0], "completed: total=2 sent=1 failed=1 processed=2");
        assert!(lines[1].starts_with("failed 5: "));
        assert!(lines[1].contains("chat not found"));
    }

    #[test]
    fn send_delivers_to_file_recipients_and_reports_to_operator_chat() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "11\n12\n13").expect("write recipients");
        let config = config_with_recipients(&file);
        let transport = RecordingTransport::new().failing_for(&[12]);

        send(
            &config,
            &transport,
            &["/broadcast".to_owned(), "hello".to_owned()],
            None,
            None,
            &CancelFlag::new(),
        )
        .expect("send should succeed");

        assert_eq!(transport.sends_excluding(ChatId(777)).len(), 3);
        let edits = transport.edits.borrow();
        assert_eq!(edits.len(), 2);
        assert!(edits[1].text.contains("Success rate: 66.7%"));
    }

    #[test]
    fn send_reports_usage_and_exits_cleanly_for_empty_message() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let config = config_with_recipients(&file);
        let transport = RecordingTransport::new();

        send(&config, &transport, &[], Some(888), None, &CancelFlag::new())
            .expect("usage errors are reported in chat");

        let replies = transport.sends_to(ChatId(888));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Usage"));
    }

    #[test]
    fn send_requires_operator_chat() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let mut config = config_with_recipients(&file);
        config.operator.chat_id = None;

        let error = send(
            &config,
            &DryRunTransport::new(),
            &["hi".to_owned()],
            None,
            None,
            &CancelFlag::new(),
        )
        .expect_err("operator chat is required");

        assert!(matches!(
            error.downcast_ref::<AppError>(),
            Some(AppError::MissingOperatorChat)
        ));
    }

    #[test]
    fn status_message_failure_is_an_error_exit() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "11").expect("write recipients");
        let config = config_with_recipients(&file);
        let transport = RecordingTransport::new().failing_for(&[777]);

        let error = send(
            &config,
            &transport,
            &["hi".to_owned()],
            None,
            None,
            &CancelFlag::new(),
        )
        .expect_err("no status message means no broadcast");

        assert!(matches!(
            error.downcast_ref::<BroadcastError>(),
            Some(BroadcastError::StatusMessage(_))
        ));
    }
}
