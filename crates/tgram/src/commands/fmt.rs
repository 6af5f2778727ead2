//! `fmt` command: run the formatting pipeline without sending.

use std::path::PathBuf;

use clap::Args;
use tgram_config::{CliSettings, Config};
use tgram_format::{FormatPipeline, strip_markup};

use crate::error::CliError;
use crate::output::Output;

use super::message_text;

/// Arguments for the `fmt` command.
#[derive(Args)]
pub(crate) struct FmtArgs {
    /// Message text; read from stdin when omitted.
    text: Option<String>,

    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Strip markup instead of escaping it.
    #[arg(long)]
    plain: bool,

    /// Prefix prepended to the message (overrides config).
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix appended to the message (overrides config).
    #[arg(long)]
    suffix: Option<String>,

    /// Truncate to this many characters (max 4096).
    #[arg(long)]
    truncate: Option<usize>,
}

impl FmtArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            prefix: self.prefix,
            suffix: self.suffix,
            truncate: self.truncate,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let options = config.formatting.to_options();

        let text = message_text(self.text)?;
        let outcome = FormatPipeline::new().format(&text, &options);
        let formatted = if self.plain {
            strip_markup(&outcome.text)
        } else {
            outcome.text
        };

        output.payload(&formatted);
        Ok(())
    }
}
