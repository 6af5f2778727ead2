//! `send` command: format and deliver a message.

use std::path::PathBuf;

use clap::Args;
use tgram_client::Messenger;
use tgram_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

use super::message_text;

/// Arguments for the `send` command.
#[derive(Args)]
pub(crate) struct SendArgs {
    /// Message text; read from stdin when omitted.
    text: Option<String>,

    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Destination chat id or @username (overrides config).
    #[arg(long)]
    chat_id: Option<String>,

    /// Send as plain text: markup stripped, no parse mode.
    #[arg(long)]
    plain: bool,

    /// Keep link previews enabled.
    #[arg(long)]
    preview: bool,

    /// Prefix prepended to the message (overrides config).
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix appended to the message (overrides config).
    #[arg(long)]
    suffix: Option<String>,

    /// Truncate to this many characters (max 4096).
    #[arg(long)]
    truncate: Option<usize>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SendArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            chat_id: self.chat_id,
            disable_link_preview: self.preview.then_some(false),
            prefix: self.prefix,
            suffix: self.suffix,
            truncate: self.truncate,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let messenger = Messenger::from_config(&config)?;

        let text = message_text(self.text)?;
        let response = if self.plain {
            messenger.send_plain(&text)?
        } else {
            messenger.send(&text)?
        };

        output.success(&format!("Message {} delivered", response.message_id));
        Ok(())
    }
}
