//! CLI command implementations.

mod check;
mod fmt;
mod send;

pub(crate) use check::CheckArgs;
pub(crate) use fmt::FmtArgs;
pub(crate) use send::SendArgs;

/// Read the message text from the argument or, when omitted, from stdin.
fn message_text(arg: Option<String>) -> std::io::Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let raw = std::io::read_to_string(std::io::stdin())?;
            Ok(raw.strip_suffix('\n').unwrap_or(&raw).to_owned())
        }
    }
}
