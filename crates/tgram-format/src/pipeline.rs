//! The formatting pipeline.
//!
//! Applies the individual transforms in a fixed order and turns an internal
//! escaping failure into a stripped plain-text message instead of an error.

use crate::email::{self, ObfuscatedEmails};
use crate::escape;
use crate::html::escape_html;
use crate::options::FormattingOptions;
use crate::strip::strip_markup;
use crate::truncate::{effective_limit, truncate};

/// Where the pipeline sends its diagnostics.
///
/// Formatting behavior is identical with any sink, including [`NoopSink`];
/// the sink only controls whether anyone hears about the recovery path.
pub trait DiagnosticSink {
    /// Report normal progress.
    fn info(&self, message: &str);
    /// Report a recovered failure.
    fn error(&self, message: &str);
}

/// Default sink, forwarding to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    /// The formatted message text.
    pub text: String,
    /// True when markdown escaping failed and the text was stripped to
    /// plain instead. The caller must then drop the markup parse mode from
    /// the outbound payload.
    pub degraded: bool,
}

/// Applies the formatting transforms in a fixed order.
///
/// Order: prefix/suffix, HTML escaping, email extraction, markdown escaping
/// (or markup stripping on failure), email restoration, truncation.
pub struct FormatPipeline<S = TracingSink> {
    sink: S,
}

impl FormatPipeline<TracingSink> {
    /// Pipeline with the default `tracing`-backed sink.
    #[must_use]
    pub fn new() -> Self {
        Self { sink: TracingSink }
    }
}

impl Default for FormatPipeline<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> FormatPipeline<S> {
    /// Pipeline with an explicit diagnostic sink.
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }

    /// Format `text` per `options`. Never fails: an internal escaping error
    /// is recovered by stripping markup and flagging the outcome degraded.
    #[must_use]
    pub fn format(&self, text: &str, options: &FormattingOptions) -> FormatOutcome {
        let text = apply_affixes(text, options);

        let text = if options.escape_html {
            escape_html(&text)
        } else {
            text
        };

        let (mut text, emails) = if options.obfuscate_emails {
            email::extract(&text)
        } else {
            (text, ObfuscatedEmails::default())
        };

        let mut degraded = false;
        if options.escape_markdown {
            match escape::escape(&text) {
                Ok(escaped) => text = escaped,
                Err(err) => {
                    self.sink
                        .error(&format!("markdown escaping failed, stripping markup: {err}"));
                    text = strip_markup(&text);
                    degraded = true;
                }
            }
        }

        if !emails.is_empty() {
            let escape_restored = options.escape_markdown && !degraded;
            text = emails.restore(&text, |address| {
                if escape_restored {
                    escape::escape_literal(address)
                } else {
                    address.to_owned()
                }
            });
        }

        let limit = effective_limit(options.truncate);
        let text = truncate(&text, limit).to_owned();

        FormatOutcome { text, degraded }
    }
}

fn apply_affixes(text: &str, options: &FormattingOptions) -> String {
    let mut out = String::with_capacity(
        text.len()
            + options.prefix.as_ref().map_or(0, String::len)
            + options.suffix.as_ref().map_or(0, String::len),
    );
    if let Some(prefix) = &options.prefix {
        out.push_str(prefix);
    }
    out.push_str(text);
    if let Some(suffix) = &options.suffix {
        out.push_str(suffix);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pipeline() -> FormatPipeline<NoopSink> {
        FormatPipeline::with_sink(NoopSink)
    }

    #[test]
    fn test_markdown_escaping_applied() {
        let outcome = pipeline().format("Hello, World!", &FormattingOptions::default());
        assert_eq!(outcome.text, "Hello, World\\!");
        assert!(!outcome.degraded);
    }

    #[test]
    fn test_all_transforms_disabled_passthrough() {
        let options = FormattingOptions {
            escape_markdown: false,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("raw *text* <b>&</b>!", &options);
        assert_eq!(outcome.text, "raw *text* <b>&</b>!");
    }

    #[test]
    fn test_prefix_and_suffix_escaped_with_content() {
        let options = FormattingOptions {
            prefix: Some("[app] ".to_owned()),
            suffix: Some(" (end)".to_owned()),
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("hi", &options);
        // The affixes go through the same escaping as the body.
        assert_eq!(outcome.text, "[app] hi \\(end\\)");
    }

    #[test]
    fn test_html_escaping_before_markdown() {
        let options = FormattingOptions {
            escape_html: true,
            escape_markdown: false,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("a < b & c", &options);
        assert_eq!(outcome.text, "a &lt; b &amp; c");
    }

    #[test]
    fn test_email_obfuscation_with_markdown_escaping() {
        let options = FormattingOptions {
            obfuscate_emails: true,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("mail john.doe@example.com now.", &options);
        assert_eq!(outcome.text, "mail joh\\.\\.\\.e@example\\.com now\\.");
    }

    #[test]
    fn test_email_local_underscore_not_treated_as_markup() {
        let options = FormattingOptions {
            obfuscate_emails: true,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("from my_report@example.com", &options);
        assert_eq!(outcome.text, "from my\\_\\.\\.\\.t@example\\.com");
    }

    #[test]
    fn test_email_obfuscation_without_escaping() {
        let options = FormattingOptions {
            escape_markdown: false,
            obfuscate_emails: true,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("mail john.doe@example.com", &options);
        assert_eq!(outcome.text, "mail joh...e@example.com");
    }

    #[test]
    fn test_truncation_runs_last() {
        let options = FormattingOptions {
            truncate: Some(10),
            escape_markdown: false,
            ..FormattingOptions::default()
        };
        let outcome = pipeline().format("This is a very long message", &options);
        assert_eq!(outcome.text, "This is a ");
        assert_eq!(outcome.text.chars().count(), 10);
    }

    #[test]
    fn test_truncation_counts_escaped_output() {
        let options = FormattingOptions {
            truncate: Some(4),
            ..FormattingOptions::default()
        };
        // "a!b!" escapes to "a\!b\!" (6 chars) and is then cut to 4.
        let outcome = pipeline().format("a!b!", &options);
        assert_eq!(outcome.text, "a\\!b");
    }

    #[test]
    fn test_ceiling_applies_without_configured_limit() {
        let options = FormattingOptions {
            escape_markdown: false,
            ..FormattingOptions::default()
        };
        let long = "x".repeat(5000);
        let outcome = pipeline().format(&long, &options);
        assert_eq!(outcome.text.chars().count(), 4096);
    }

    #[test]
    fn test_markup_preserved_through_pipeline() {
        let outcome = pipeline().format(
            "*Status:* `deploy` [log](https://ci.example.com/run?id=9)",
            &FormattingOptions::default(),
        );
        assert_eq!(
            outcome.text,
            "*Status:* `deploy` [log](https://ci.example.com/run\\?id\\=9)"
        );
        assert!(!outcome.degraded);
    }
}
