//! Telegram Bot API client.
//!
//! Sync HTTP client for the Bot API `sendMessage` method, with a bounded
//! transport-level retry. Transport retry resends the *same* formatted
//! payload after a transient failure; it is a different recovery mechanism
//! from the tier demotion in [`crate::cascade`], which reformats the message.

use std::time::Duration;

use tracing::{debug, warn};
use ureq::Agent;

use crate::error::SendFailure;
use crate::types::{ApiEnvelope, MessagePayload, ParseMode, RemoteResponse};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// The remote send operation the delivery cascade drives.
///
/// The production implementation is [`TelegramClient`]; tests substitute a
/// recording fake.
pub trait RemoteSend {
    /// Send one message payload.
    ///
    /// # Errors
    ///
    /// Returns [`SendFailure`] when the payload could not be delivered,
    /// covering both transport failures and API rejections.
    fn send(&self, payload: &MessagePayload) -> Result<RemoteResponse, SendFailure>;
}

/// Bounded same-payload retry for transport failures.
///
/// API rejections are never retried here; resending an identical payload the
/// server already refused cannot succeed.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first send.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            attempts: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Bot API client.
pub struct TelegramClient {
    agent: Agent,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

impl TelegramClient {
    /// Create a client with the default timeout and retry policy.
    #[must_use]
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create a client with an explicit HTTP timeout.
    #[must_use]
    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the transport retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }

    /// One HTTP round trip, no retry.
    fn send_once(&self, payload: &MessagePayload) -> Result<RemoteResponse, SendFailure> {
        debug!(
            parse_mode = payload.parse_mode.map(ParseMode::as_str),
            chars = payload.text.chars().count(),
            "posting sendMessage"
        );

        let response = self
            .agent
            .post(&self.send_url())
            .header("Accept", "application/json")
            .send_json(payload)?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let description = body
                .read_to_string()
                .ok()
                .and_then(|raw| describe_rejection(&raw))
                .unwrap_or_else(|| "(unable to read error body)".to_owned());
            return Err(SendFailure::Api {
                status,
                description,
            });
        }

        let envelope: ApiEnvelope<RemoteResponse> = body.read_json()?;
        match envelope.result {
            Some(result) if envelope.ok => Ok(result),
            _ => Err(SendFailure::Api {
                status,
                description: envelope
                    .description
                    .unwrap_or_else(|| "response envelope without result".to_owned()),
            }),
        }
    }
}

/// Pull the `description` out of a Bot API error body, falling back to the
/// raw body when it is not the usual envelope.
fn describe_rejection(raw: &str) -> Option<String> {
    match serde_json::from_str::<ApiEnvelope<RemoteResponse>>(raw) {
        Ok(envelope) => envelope.description.or_else(|| Some(raw.to_owned())),
        Err(_) => Some(raw.to_owned()),
    }
}

impl RemoteSend for TelegramClient {
    fn send(&self, payload: &MessagePayload) -> Result<RemoteResponse, SendFailure> {
        let mut attempt = 0;
        loop {
            match self.send_once(payload) {
                Err(failure) if failure.is_transport() && attempt < self.retry.attempts => {
                    attempt += 1;
                    warn!(
                        "transport failure, resending same payload (retry {attempt}/{}): {failure}",
                        self.retry.attempts
                    );
                    std::thread::sleep(self.retry.delay);
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_send_url_strips_trailing_slash() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            client.send_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_describe_rejection_reads_envelope() {
        let raw = r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#;
        assert_eq!(
            describe_rejection(raw).unwrap(),
            "Bad Request: can't parse entities"
        );
    }

    #[test]
    fn test_describe_rejection_falls_back_to_raw_body() {
        assert_eq!(describe_rejection("gateway timeout").unwrap(), "gateway timeout");
    }

    #[test]
    fn test_retry_policy_none() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.attempts, 0);
        assert_eq!(policy.delay, Duration::ZERO);
    }
}
