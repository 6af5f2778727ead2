//! Markup stripping for the plain-text fallback.

use std::sync::LazyLock;

use regex::Regex;

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("invalid link regex"));

/// Remove markup syntax instead of escaping it.
///
/// Collapses `[text](url)` tokens to their text and deletes emphasis,
/// strikethrough, and code markers. Used when a message must go out as plain
/// text: either the escaper failed or the delivery tier demands it.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    let collapsed = LINK_PATTERN.replace_all(text, "$1");
    collapsed
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '~' | '`'))
        .collect()
}
