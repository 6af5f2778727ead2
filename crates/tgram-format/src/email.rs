//! Email address obfuscation.
//!
//! Addresses are redacted in two phases so later escaping passes cannot
//! mangle them: [`extract`] swaps each address for a placeholder and records
//! the obfuscated form, and [`ObfuscatedEmails::restore`] substitutes the
//! forms back in once escaping is done. A local part like `my_name` would
//! otherwise open an italic span halfway through an address.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("invalid email regex")
});

/// Placeholder delimiter. A private-use code point: not special to the
/// markup escaper, not an HTML metacharacter, and not valid address text.
const DELIMITER: char = '\u{E000}';

/// Obfuscated addresses lifted out of a message, keyed by placeholder index.
#[derive(Debug, Default)]
pub struct ObfuscatedEmails {
    entries: Vec<String>,
}

impl ObfuscatedEmails {
    /// Whether any address was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute placeholders back with their obfuscated addresses.
    ///
    /// `escape` is applied to each restored substring exactly once, so the
    /// literal `...` and the domain punctuation end up escaped the same way
    /// as the text around them.
    #[must_use]
    pub fn restore(&self, text: &str, escape: impl Fn(&str) -> String) -> String {
        let mut out = text.to_owned();
        for (idx, entry) in self.entries.iter().enumerate() {
            out = out.replace(&placeholder(idx), &escape(entry));
        }
        out
    }
}

/// Replace every email-like substring with a unique placeholder and record
/// the obfuscated form for later restoration.
#[must_use]
pub fn extract(text: &str) -> (String, ObfuscatedEmails) {
    let mut entries = Vec::new();
    let replaced = EMAIL_PATTERN.replace_all(text, |caps: &regex::Captures<'_>| {
        let marker = placeholder(entries.len());
        entries.push(obfuscate_address(&caps[0]));
        marker
    });
    (replaced.into_owned(), ObfuscatedEmails { entries })
}

/// Redact the local part of a single address; the domain stays verbatim.
///
/// Local parts longer than four characters keep their first three and last
/// characters around a literal `...`; shorter ones keep only the first.
#[must_use]
pub fn obfuscate_address(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_owned();
    };
    let chars: Vec<char> = local.chars().collect();
    let Some(&first) = chars.first() else {
        return email.to_owned();
    };
    let mut redacted = String::with_capacity(local.len());
    if chars.len() > 4 {
        redacted.extend(&chars[..3]);
        redacted.push_str("...");
        redacted.push(chars[chars.len() - 1]);
    } else {
        redacted.push(first);
        redacted.push_str("...");
    }
    format!("{redacted}@{domain}")
}

fn placeholder(idx: usize) -> String {
    format!("{DELIMITER}{idx}{DELIMITER}")
}
