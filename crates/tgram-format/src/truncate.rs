//! Message length bounding.

/// Hard message-length ceiling of the Telegram Bot API, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Truncate `text` to at most `limit` characters.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point.
#[must_use]
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Resolve the limit a message is actually truncated to.
///
/// The platform ceiling always applies; a configured limit can only lower it.
#[must_use]
pub fn effective_limit(configured: Option<usize>) -> usize {
    configured.map_or(MAX_MESSAGE_CHARS, |n| n.min(MAX_MESSAGE_CHARS))
}
