//! Message formatting for Telegram's MarkdownV2 dialect.
//!
//! This crate turns arbitrary, untrusted text into a payload the strict
//! MarkdownV2 grammar accepts, while preserving recognized inline markup
//! (emphasis, code spans, fenced blocks, `[text](url)` links).
//!
//! The individual transforms are available directly ([`escape`],
//! [`escape_html`], [`strip_markup`], [`truncate`]); [`FormatPipeline`]
//! composes them in the order a message actually needs:
//!
//! ```
//! use tgram_format::{FormatPipeline, FormattingOptions};
//!
//! let pipeline = FormatPipeline::new();
//! let outcome = pipeline.format("Deploy done!", &FormattingOptions::default());
//! assert_eq!(outcome.text, "Deploy done\\!");
//! ```
//!
//! A failed escaping pass never surfaces as an error: the pipeline strips
//! markup instead and flags the outcome so callers drop the parse mode.

mod email;
mod error;
mod escape;
mod html;
mod options;
mod pipeline;
mod strip;
mod truncate;

pub use email::{ObfuscatedEmails, extract as extract_emails, obfuscate_address};
pub use error::FormatError;
pub use escape::{SPECIAL_CHARS, escape, escape_literal, is_special};
pub use html::escape_html;
pub use options::{FormattingOptions, FormattingOverrides};
pub use pipeline::{DiagnosticSink, FormatOutcome, FormatPipeline, NoopSink, TracingSink};
pub use strip::strip_markup;
pub use truncate::{MAX_MESSAGE_CHARS, effective_limit, truncate};
