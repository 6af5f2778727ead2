//! Configuration management for tgram.
//!
//! Parses `tgram.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `telegram.bot_token`
//! - `telegram.chat_id`
//! - `telegram.api_base_url`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tgram_format::{FormattingOptions, MAX_MESSAGE_CHARS};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tgram.toml";

/// Default Bot API endpoint.
const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the destination chat.
    pub chat_id: Option<String>,
    /// Override link preview suppression.
    pub disable_link_preview: Option<bool>,
    /// Override the message prefix.
    pub prefix: Option<String>,
    /// Override the message suffix.
    pub suffix: Option<String>,
    /// Override the truncation limit.
    pub truncate: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Telegram credentials and destination (required for sending).
    pub telegram: Option<TelegramConfig>,
    /// Default formatting applied to every message.
    pub formatting: FormattingConfig,
    /// Transport tuning.
    pub delivery: DeliveryConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Telegram credentials and destination.
#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,
    /// Destination chat: a numeric id or an `@channelusername`.
    pub chat_id: String,
    /// Bot API endpoint; override for a local Bot API server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Suppress link previews on sent messages.
    #[serde(default = "default_disable_link_preview")]
    pub disable_link_preview: bool,
}

impl TelegramConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.bot_token, "telegram.bot_token")?;
        require_non_empty(&self.chat_id, "telegram.chat_id")?;
        require_non_empty(&self.api_base_url, "telegram.api_base_url")?;
        require_http_url(&self.api_base_url, "telegram.api_base_url")?;
        Ok(())
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

fn default_disable_link_preview() -> bool {
    true
}

/// Default formatting applied to every message.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Escape MarkdownV2 special characters.
    pub escape_markdown: bool,
    /// Redact email local parts.
    pub obfuscate_emails: bool,
    /// Replace `<`, `>`, `&` with entities.
    pub escape_html: bool,
    /// Truncation limit in characters (the 4096 platform ceiling always applies).
    pub truncate: Option<usize>,
    /// Literal prefix prepended to every message.
    pub prefix: Option<String>,
    /// Literal suffix appended to every message.
    pub suffix: Option<String>,
}

impl Default for FormattingConfig {
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

impl FormattingConfig {
    /// Convert to the formatting crate's per-message options value.
    #[must_use]
    pub fn to_options(&self) -> FormattingOptions {
        FormattingOptions {
            escape_markdown: self.escape_markdown,
            obfuscate_emails: self.obfuscate_emails,
            escape_html: self.escape_html,
            truncate: self.truncate,
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
    }
}

/// Transport tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
    /// Additional same-payload attempts after a transport failure.
    pub retry_count: u32,
    /// Delay between transport retries, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_count: 2,
            retry_delay_ms: 250,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`telegram.bot_token`").
        field: String,
        /// Error message (e.g., "${`TGRAM_BOT_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tgram.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(chat_id) = &settings.chat_id
            && let Some(telegram) = &mut self.telegram
        {
            telegram.chat_id.clone_from(chat_id);
        }
        if let Some(disable) = settings.disable_link_preview
            && let Some(telegram) = &mut self.telegram
        {
            telegram.disable_link_preview = disable;
        }
        if let Some(prefix) = &settings.prefix {
            self.formatting.prefix = Some(prefix.clone());
        }
        if let Some(suffix) = &settings.suffix {
            self.formatting.suffix = Some(suffix.clone());
        }
        if let Some(truncate) = settings.truncate {
            self.formatting.truncate = Some(truncate);
        }
    }

    /// Get validated Telegram configuration.
    ///
    /// Returns the Telegram config if the `[telegram]` section is present and
    /// all fields are valid. Use this instead of accessing the `telegram`
    /// field directly when the command requires credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_telegram(&self) -> Result<&TelegramConfig, ConfigError> {
        let telegram = self.telegram.as_ref().ok_or_else(|| {
            ConfigError::Validation("[telegram] section required in config".into())
        })?;
        telegram.validate()?;
        Ok(telegram)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid
    /// values. Called automatically after loading from file. The `[telegram]`
    /// section is validated lazily by [`Self::require_telegram`] so that
    /// formatting-only commands work without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_formatting()?;
        self.validate_delivery()?;
        Ok(())
    }

    fn validate_formatting(&self) -> Result<(), ConfigError> {
        if let Some(limit) = self.formatting.truncate {
            if limit == 0 {
                return Err(ConfigError::Validation(
                    "formatting.truncate must be greater than 0".to_owned(),
                ));
            }
            if limit > MAX_MESSAGE_CHARS {
                return Err(ConfigError::Validation(format!(
                    "formatting.truncate cannot exceed {MAX_MESSAGE_CHARS}"
                )));
            }
        }
        Ok(())
    }

    fn validate_delivery(&self) -> Result<(), ConfigError> {
        if self.delivery.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "delivery.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut telegram) = self.telegram {
            telegram.bot_token = expand::expand_env(&telegram.bot_token, "telegram.bot_token")?;
            telegram.chat_id = expand::expand_env(&telegram.chat_id, "telegram.chat_id")?;
            telegram.api_base_url =
                expand::expand_env(&telegram.api_base_url, "telegram.api_base_url")?;
        }
        Ok(())
    }
}
