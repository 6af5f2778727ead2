//! `check` command: load and validate configuration.

use std::path::PathBuf;

use clap::Args;
use tgram_client::ChatTarget;
use tgram_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the `check` command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;

        match &config.config_path {
            Some(path) => output.info(&format!("Config: {}", path.display())),
            None => output.info("Config: built-in defaults (no tgram.toml found)"),
        }

        let telegram = config.require_telegram()?;
        let target = ChatTarget::parse(&telegram.chat_id);
        output.highlight(&format!("Target: {target:?}"));
        output.info(&format!("API endpoint: {}", telegram.api_base_url));

        let formatting = &config.formatting;
        output.info(&format!(
            "Formatting: escape_markdown={} obfuscate_emails={} escape_html={}",
            formatting.escape_markdown, formatting.obfuscate_emails, formatting.escape_html
        ));
        if let Some(limit) = formatting.truncate {
            output.info(&format!("Truncate: {limit} chars"));
        }

        output.success("Configuration is valid");
        Ok(())
    }
}
