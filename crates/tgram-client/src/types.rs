//! Wire types for the Bot API `sendMessage` call.

use serde::{Deserialize, Serialize};

/// Outbound `parse_mode` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    /// Strict MarkdownV2 dialect.
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    /// HTML subset.
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    /// The tag as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html => "HTML",
        }
    }
}

/// Destination chat: a numeric id or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatTarget {
    /// Numeric chat id (negative for groups and channels).
    Id(i64),
    /// Public channel or group username, including the leading `@`.
    Username(String),
}

impl ChatTarget {
    /// Parse a configured chat id string.
    ///
    /// Numeric strings (with optional leading `-`) become [`Self::Id`];
    /// anything else is treated as a username, with a leading `@` added when
    /// missing.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Ok(id) = raw.parse::<i64>() {
            return Self::Id(id);
        }
        if raw.starts_with('@') {
            Self::Username(raw.to_owned())
        } else {
            Self::Username(format!("@{raw}"))
        }
    }
}

/// One `sendMessage` request.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    /// Destination chat.
    #[serde(rename = "chat_id")]
    pub target: ChatTarget,
    /// Formatted message text.
    pub text: String,
    /// Markup tag; absent for plain text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    /// Suppress the link preview for URLs in the text.
    #[serde(rename = "disable_web_page_preview")]
    pub disable_link_preview: bool,
}

/// The message object returned on a successful send.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteResponse {
    /// Id of the delivered message within its chat.
    pub message_id: i64,
    /// Unix send timestamp.
    #[serde(default)]
    pub date: i64,
}

/// Response envelope common to every Bot API method.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}
