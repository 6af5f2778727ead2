//! High-level send entry point.

use std::time::Duration;

use tgram_config::Config;
use tgram_format::{FormattingOptions, FormattingOverrides};

use crate::cascade::{DeliveryCascade, DeliveryTier};
use crate::client::{RetryPolicy, TelegramClient};
use crate::error::SendFailure;
use crate::types::{ChatTarget, RemoteResponse};

/// A configured client plus the delivery cascade, ready to send.
///
/// ```no_run
/// use tgram_client::Messenger;
/// use tgram_config::Config;
///
/// let config = Config::load(None, None).unwrap();
/// let messenger = Messenger::from_config(&config).unwrap();
/// messenger.send("Deploy finished!").unwrap();
/// ```
pub struct Messenger {
    client: TelegramClient,
    target: ChatTarget,
    disable_link_preview: bool,
    options: FormattingOptions,
}

impl Messenger {
    /// Build a messenger from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`tgram_config::ConfigError`] when the `[telegram]` section is
    /// missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self, tgram_config::ConfigError> {
        let telegram = config.require_telegram()?;
        let delivery = &config.delivery;

        let client = TelegramClient::with_timeout(
            &telegram.api_base_url,
            &telegram.bot_token,
            Duration::from_secs(delivery.timeout_secs),
        )
        .retry_policy(RetryPolicy {
            attempts: delivery.retry_count,
            delay: Duration::from_millis(delivery.retry_delay_ms),
        });

        Ok(Self {
            client,
            target: ChatTarget::parse(&telegram.chat_id),
            disable_link_preview: telegram.disable_link_preview,
            options: config.formatting.to_options(),
        })
    }

    /// Send a message with the configured default formatting.
    ///
    /// # Errors
    ///
    /// Returns the last [`SendFailure`] after every delivery tier was refused.
    pub fn send(&self, text: &str) -> Result<RemoteResponse, SendFailure> {
        self.send_with(text, &FormattingOverrides::default())
    }

    /// Send a message with per-call formatting overrides.
    ///
    /// # Errors
    ///
    /// Returns the last [`SendFailure`] after every delivery tier was refused.
    pub fn send_with(
        &self,
        text: &str,
        overrides: &FormattingOverrides,
    ) -> Result<RemoteResponse, SendFailure> {
        let options = self.options.merged(overrides);
        DeliveryCascade::new(&self.client, self.target.clone())
            .disable_link_preview(self.disable_link_preview)
            .send(text, &options)
    }

    /// Send as plain text only: markup stripped, no parse mode, one attempt.
    ///
    /// # Errors
    ///
    /// Returns the [`SendFailure`] from the single plain-text attempt.
    pub fn send_plain(&self, text: &str) -> Result<RemoteResponse, SendFailure> {
        DeliveryCascade::new(&self.client, self.target.clone())
            .disable_link_preview(self.disable_link_preview)
            .starting_tier(DeliveryTier::PlainText)
            .send(text, &self.options)
    }

    /// The formatting defaults this messenger applies.
    #[must_use]
    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// The resolved destination chat.
    #[must_use]
    pub fn target(&self) -> &ChatTarget {
        &self.target
    }
}
