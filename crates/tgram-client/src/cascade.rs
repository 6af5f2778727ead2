//! Delivery-tier fallback cascade.
//!
//! Reformats a rejected message one tier more conservatively per failed
//! attempt: MarkdownV2, then HTML with entities escaped, then plain text
//! with markup stripped. One attempt per tier, three at most; the failure
//! from the plain-text attempt is the one surfaced to the caller.

use tgram_format::{FormatPipeline, FormattingOptions, strip_markup};
use tracing::{info, warn};

use crate::client::RemoteSend;
use crate::error::SendFailure;
use crate::types::{ChatTarget, MessagePayload, ParseMode, RemoteResponse};

/// Maximum send attempts per logical message, one per tier.
const MAX_ATTEMPTS: usize = 3;

/// Formatting richness, in demotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeliveryTier {
    /// MarkdownV2 with dialect escaping.
    RichMarkup,
    /// HTML parse mode with entity escaping, no dialect escaping.
    BasicMarkup,
    /// No parse mode; markup syntax stripped.
    PlainText,
}

impl DeliveryTier {
    /// The next more conservative tier, if any.
    #[must_use]
    pub fn demoted(self) -> Option<Self> {
        match self {
            Self::RichMarkup => Some(Self::BasicMarkup),
            Self::BasicMarkup => Some(Self::PlainText),
            Self::PlainText => None,
        }
    }

    /// Parse mode tag this tier sends with.
    #[must_use]
    pub fn parse_mode(self) -> Option<ParseMode> {
        match self {
            Self::RichMarkup => Some(ParseMode::MarkdownV2),
            Self::BasicMarkup => Some(ParseMode::Html),
            Self::PlainText => None,
        }
    }

    /// Derive tier-appropriate options from the caller's base options.
    ///
    /// Only the escaping flags change per tier; obfuscation, truncation, and
    /// affixes ride through unchanged.
    fn options(self, base: &FormattingOptions) -> FormattingOptions {
        let mut options = base.clone();
        match self {
            Self::RichMarkup => {
                options.escape_markdown = true;
                options.escape_html = false;
            }
            Self::BasicMarkup => {
                options.escape_markdown = false;
                options.escape_html = true;
            }
            Self::PlainText => {
                options.escape_markdown = false;
                options.escape_html = false;
            }
        }
        options
    }
}

/// Sends one message through decreasingly rich formatting tiers until the
/// remote accepts it.
pub struct DeliveryCascade<'a, R> {
    remote: &'a R,
    pipeline: FormatPipeline,
    target: ChatTarget,
    disable_link_preview: bool,
    start: DeliveryTier,
}

impl<'a, R: RemoteSend> DeliveryCascade<'a, R> {
    /// Create a cascade over a remote-send implementation.
    #[must_use]
    pub fn new(remote: &'a R, target: ChatTarget) -> Self {
        Self {
            remote,
            pipeline: FormatPipeline::new(),
            target,
            disable_link_preview: true,
            start: DeliveryTier::RichMarkup,
        }
    }

    /// Set link preview suppression on outgoing payloads.
    #[must_use]
    pub fn disable_link_preview(mut self, disable: bool) -> Self {
        self.disable_link_preview = disable;
        self
    }

    /// Start from a more conservative tier. Starting at
    /// [`DeliveryTier::PlainText`] makes exactly one attempt.
    #[must_use]
    pub fn starting_tier(mut self, tier: DeliveryTier) -> Self {
        self.start = tier;
        self
    }

    /// Send `text`, demoting the formatting tier on each failure.
    ///
    /// Returns the first accepted response, or the last failure once the
    /// plain-text tier has been refused as well. Formatting alone never
    /// produces an error.
    ///
    /// # Errors
    ///
    /// Returns the final [`SendFailure`] after all tiers are exhausted.
    pub fn send(
        &self,
        text: &str,
        options: &FormattingOptions,
    ) -> Result<RemoteResponse, SendFailure> {
        let mut tier = self.start;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let payload = self.build_payload(text, options, tier);

            match self.remote.send(&payload) {
                Ok(response) => {
                    if attempts > 1 {
                        info!("message accepted at {tier:?} after {attempts} attempts");
                    }
                    return Ok(response);
                }
                Err(failure) => match tier.demoted() {
                    Some(next) if attempts < MAX_ATTEMPTS => {
                        warn!("send failed at {tier:?}, demoting to {next:?}: {failure}");
                        tier = next;
                    }
                    _ => return Err(failure),
                },
            }
        }
    }

    fn build_payload(
        &self,
        text: &str,
        base: &FormattingOptions,
        tier: DeliveryTier,
    ) -> MessagePayload {
        let options = tier.options(base);
        let outcome = self.pipeline.format(text, &options);

        let text = if tier == DeliveryTier::PlainText {
            strip_markup(&outcome.text)
        } else {
            outcome.text
        };

        // A degraded outcome has no markup left to parse.
        let parse_mode = if outcome.degraded {
            None
        } else {
            tier.parse_mode()
        };

        MessagePayload {
            target: self.target.clone(),
            text,
            parse_mode,
            disable_link_preview: self.disable_link_preview,
        }
    }
}
