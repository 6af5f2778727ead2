//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `${VAR}` errors when the variable is unset; `${VAR:-default}` falls back
/// to the default instead. `field` is the configuration field path used in
/// error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let context = |name: &str| -> Result<Option<String>, String> {
        // shellexpand passes the full `VAR:-default` text as the name.
        let (var, default) = match name.split_once(":-") {
            Some((var, default)) => (var, Some(default)),
            None => (name, None),
        };
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => default.map_or_else(
                || Err(format!("${{{var}}} not set")),
                |d| Ok(Some(d.to_owned())),
            ),
            Err(err) => Err(format!("${{{var}}}: {err}")),
        }
    };

    shellexpand::env_with_context(value, context)
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: err.cause,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("plain text", "f").unwrap(), "plain text");
    }

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TGRAM_EXPAND_TEST", "value");
        }
        assert_eq!(expand_env("${TGRAM_EXPAND_TEST}", "f").unwrap(), "value");
        unsafe {
            std::env::remove_var("TGRAM_EXPAND_TEST");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TGRAM_EXPAND_MISSING");
        }
        assert_eq!(
            expand_env("${TGRAM_EXPAND_MISSING:-fallback}", "f").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_missing_required_variable_errors() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TGRAM_EXPAND_ABSENT");
        }
        let err = expand_env("${TGRAM_EXPAND_ABSENT}", "telegram.bot_token").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("TGRAM_EXPAND_ABSENT"));
        assert!(err.to_string().contains("telegram.bot_token"));
    }
}
