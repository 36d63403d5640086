use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tgcast", about = "Bulk Telegram broadcaster with live progress reporting")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log sends and edits instead of calling Telegram
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Broadcast one message to every recipient, then exit
    Send {
        /// Message body; HTML markup is passed through to Telegram
        message: Vec<String>,

        /// Chat that receives the progress message (default: [operator].chat_id)
        #[arg(long, allow_negative_numbers = true)]
        chat: Option<i64>,

        /// Account recorded as the requester in the audit log (default: the chat id)
        #[arg(long, allow_negative_numbers = true)]
        operator: Option<i64>,
    },
    /// Run as a bot and broadcast on admin commands
    Listen,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Listen)
    }
}
