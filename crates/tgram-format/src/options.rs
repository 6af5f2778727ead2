//! Per-message formatting options.

/// Formatting options applied to a single message.
///
/// Immutable per call. Defaults typically come from configuration; per-call
/// adjustments go through [`FormattingOverrides`] and [`Self::merged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingOptions {
    /// Escape MarkdownV2 special characters outside recognized markup.
    pub escape_markdown: bool,
    /// Redact the local part of email-like substrings.
    pub obfuscate_emails: bool,
    /// Replace `<`, `>`, `&` with HTML entities.
    pub escape_html: bool,
    /// Truncate to this many characters. The 4096-character platform
    /// ceiling applies regardless; this can only lower it.
    pub truncate: Option<usize>,
    /// Literal text prepended before any other transform runs.
    pub prefix: Option<String>,
    /// Literal text appended before any other transform runs.
    pub suffix: Option<String>,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            escape_markdown: true,
            obfuscate_emails: false,
            escape_html: false,
            truncate: None,
            prefix: None,
            suffix: None,
        }
    }
}

impl FormattingOptions {
    /// Merge per-call overrides over this base, field by field.
    ///
    /// Only fields set on the override change; everything else is kept.
    #[must_use]
    pub fn merged(&self, overrides: &FormattingOverrides) -> Self {
        Self {
            escape_markdown: overrides.escape_markdown.unwrap_or(self.escape_markdown),
            obfuscate_emails: overrides.obfuscate_emails.unwrap_or(self.obfuscate_emails),
            escape_html: overrides.escape_html.unwrap_or(self.escape_html),
            truncate: overrides.truncate.or(self.truncate),
            prefix: overrides.prefix.clone().or_else(|| self.prefix.clone()),
            suffix: overrides.suffix.clone().or_else(|| self.suffix.clone()),
        }
    }
}

/// Per-call overrides for [`FormattingOptions`].
///
/// All fields are optional; only set fields win over the base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingOverrides {
    /// Override markdown escaping.
    pub escape_markdown: Option<bool>,
    /// Override email obfuscation.
    pub obfuscate_emails: Option<bool>,
    /// Override HTML escaping.
    pub escape_html: Option<bool>,
    /// Override the truncation limit.
    pub truncate: Option<usize>,
    /// Override the message prefix.
    pub prefix: Option<String>,
    /// Override the message suffix.
    pub suffix: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormattingOptions::default();
        assert!(options.escape_markdown);
        assert!(!options.obfuscate_emails);
        assert!(!options.escape_html);
        assert_eq!(options.truncate, None);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let base = FormattingOptions {
            obfuscate_emails: true,
            truncate: Some(200),
            prefix: Some("[app] ".to_owned()),
            ..FormattingOptions::default()
        };
        assert_eq!(base.merged(&FormattingOverrides::default()), base);
    }

    #[test]
    fn test_override_wins_field_by_field() {
        let base = FormattingOptions {
            truncate: Some(200),
            ..FormattingOptions::default()
        };
        let merged = base.merged(&FormattingOverrides {
            escape_markdown: Some(false),
            truncate: Some(50),
            ..FormattingOverrides::default()
        });
        assert!(!merged.escape_markdown);
        assert_eq!(merged.truncate, Some(50));
        // Untouched fields keep base values.
        assert!(!merged.obfuscate_emails);
        assert_eq!(merged.prefix, None);
    }

    #[test]
    fn test_override_prefix_replaces_base() {
        let base = FormattingOptions {
            prefix: Some("old ".to_owned()),
            ..FormattingOptions::default()
        };
        let merged = base.merged(&FormattingOverrides {
            prefix: Some("new ".to_owned()),
            ..FormattingOverrides::default()
        });
        assert_eq!(merged.prefix.as_deref(), Some("new "));
    }
}
