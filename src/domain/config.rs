//! # Configuration
//!
//! Manages the loading and validation of the bot's configuration file (`config.yaml`).
//! Defines the structs for the Matrix session, the sender whitelist and the webhook table.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::strings::messages::DEFAULT_ACKNOWLEDGEMENT;

pub const DEFAULT_COMMAND_PREFIX: &str = "!b0t";

/// Main application configuration structure.
/// Matches the layout of `config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub matrix: MatrixConfig,
    /// Sender identity -> permitted command names.
    pub users: BTreeMap<String, CommandList>,
    /// Command name -> webhook URL.
    pub webhooks: BTreeMap<String, String>,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    #[serde(default)]
    pub server_url: Option<String>,
    /// Legacy single-room setting. Still required, never used for routing.
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_acknowledgement")]
    pub acknowledgement: String,
}

/// Outbound HTTP settings.
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for `b0t.log`. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

/// Command names for one sender, written either as `"deploy,restart"` or as a list.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CommandList {
    Csv(String),
    List(Vec<String>),
}

impl CommandList {
    /// Individual command names, trimmed, with empty entries dropped.
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            CommandList::Csv(s) => s.split(',').collect(),
            CommandList::List(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// How the bot authenticates against the homeserver.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Token(String),
    Password { username: String, password: String },
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

fn default_acknowledgement() -> String {
    DEFAULT_ACKNOWLEDGEMENT.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Treats `key: ""` (or only whitespace) the same as a missing key.
/// The value itself is returned untouched.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Reads, parses and validates the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("server_url", &self.matrix.server_url),
            ("room_id", &self.matrix.room_id),
        ] {
            if present(value).is_none() {
                bail!("Missing key {key} in section matrix in config file");
            }
        }

        self.credentials()?;

        if self.matrix.command_prefix.is_empty() {
            bail!("command_prefix in section matrix must not be empty");
        }

        for (command, url) in &self.webhooks {
            reqwest::Url::parse(url)
                .with_context(|| format!("Invalid webhook URL for command `{command}`: {url}"))?;
        }

        for (sender, commands) in &self.users {
            for command in commands.names() {
                if !self.webhooks.contains_key(&command) {
                    bail!(
                        "Command `{command}` is permitted for {sender} but has no entry in section webhooks"
                    );
                }
            }
        }

        if self.webhook.timeout_secs == 0 {
            bail!("timeout_secs in section webhook must be greater than zero");
        }

        Ok(())
    }

    /// Picks the login method. A token wins over username/password.
    pub fn credentials(&self) -> Result<Credentials> {
        let m = &self.matrix;
        if let Some(token) = present(&m.token) {
            return Ok(Credentials::Token(token.to_string()));
        }
        match (present(&m.username), present(&m.password)) {
            (Some(username), Some(password)) => Ok(Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => bail!(
                "Either 'token' or 'username' and 'password' are required in the 'matrix' section of the config file"
            ),
        }
    }

    pub fn server_url(&self) -> &str {
        present(&self.matrix.server_url)
            .map(str::trim)
            .unwrap_or_default()
    }

    /// `None` when acknowledgements are switched off with an empty string.
    pub fn acknowledgement(&self) -> Option<&str> {
        Some(self.matrix.acknowledgement.as_str()).filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
matrix:
  server_url: https://matrix.example.org
  room_id: "!legacy:example.org"
  username: b0t
  password: hunter2
users:
  "@alice:example.org": "deploy, restart"
  "@carol:example.org": [deploy]
webhooks:
  deploy: http://hooks.local/deploy
  restart: http://hooks.local/restart
"#;

    #[test]
    fn test_parse_valid_config() {
        let config = AppConfig::parse(VALID).unwrap();
        assert_eq!(config.matrix.command_prefix, "!b0t");
        assert_eq!(config.server_url(), "https://matrix.example.org");
        assert_eq!(config.webhook.timeout_secs, 30);
        assert!(config.logging.directory.is_none());
        assert_eq!(
            config.users["@alice:example.org"].names(),
            vec!["deploy".to_string(), "restart".to_string()]
        );
        assert_eq!(
            config.users["@carol:example.org"].names(),
            vec!["deploy".to_string()]
        );
        assert_eq!(config.acknowledgement(), Some(DEFAULT_ACKNOWLEDGEMENT));
    }

    #[test]
    fn test_password_credentials() {
        let config = AppConfig::parse(VALID).unwrap();
        assert_eq!(
            config.credentials().unwrap(),
            Credentials::Password {
                username: "b0t".to_string(),
                password: "hunter2".to_string(),
            }
        );
    }

    #[test]
    fn test_token_wins_over_password() {
        let yaml = VALID.replace("  username: b0t\n", "  username: b0t\n  token: abc\n");
        let config = AppConfig::parse(&yaml).unwrap();
        assert_eq!(
            config.credentials().unwrap(),
            Credentials::Token("abc".to_string())
        );
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let yaml = VALID.replace("  password: hunter2\n", "");
        let err = AppConfig::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("'token' or 'username' and 'password'"));

        let yaml = VALID.replace("  password: hunter2\n", "  password: \"\"\n");
        assert!(AppConfig::parse(&yaml).is_err());
    }

    #[test]
    fn test_credentials_keep_surrounding_spaces() {
        let yaml = VALID.replace("  password: hunter2\n", "  password: \" hunter2 \"\n");
        let config = AppConfig::parse(&yaml).unwrap();
        assert_eq!(
            config.credentials().unwrap(),
            Credentials::Password {
                username: "b0t".to_string(),
                password: " hunter2 ".to_string(),
            }
        );

        let yaml = VALID.replace("  username: b0t\n", "  username: b0t\n  token: \"  \"\n");
        let config = AppConfig::parse(&yaml).unwrap();
        assert!(matches!(config.credentials().unwrap(), Credentials::Password { .. }));
    }

    #[test]
    fn test_missing_required_keys() {
        let yaml = VALID.replace("  server_url: https://matrix.example.org\n", "");
        let err = AppConfig::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("server_url"));

        let yaml = VALID.replace("  room_id: \"!legacy:example.org\"\n", "");
        let err = AppConfig::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("room_id"));
    }

    #[test]
    fn test_missing_section_rejected() {
        let yaml = VALID.replace("webhooks:", "hooks:");
        assert!(AppConfig::parse(&yaml).is_err());
    }

    #[test]
    fn test_unregistered_command_rejected() {
        let yaml = VALID.replace("[deploy]", "[deploy, reboot]");
        let err = AppConfig::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("`reboot`"));
    }

    #[test]
    fn test_invalid_webhook_url_rejected() {
        let yaml = VALID.replace("http://hooks.local/restart", "not a url");
        let err = AppConfig::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("restart"));
    }

    #[test]
    fn test_custom_prefix_and_disabled_ack() {
        let yaml = VALID.replace(
            "  password: hunter2\n",
            "  password: hunter2\n  command_prefix: \"!ops\"\n  acknowledgement: \"\"\n",
        );
        let config = AppConfig::parse(&yaml).unwrap();
        assert_eq!(config.matrix.command_prefix, "!ops");
        assert_eq!(config.acknowledgement(), None);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let yaml = VALID.replace(
            "  password: hunter2\n",
            "  password: hunter2\n  command_prefix: \"\"\n",
        );
        assert!(AppConfig::parse(&yaml).is_err());
    }

    #[test]
    fn test_command_list_names() {
        let csv = CommandList::Csv(" a,, b ,c".to_string());
        assert_eq!(csv.names(), vec!["a", "b", "c"]);
        let list = CommandList::List(vec!["x".to_string(), " ".to_string()]);
        assert_eq!(list.names(), vec!["x"]);
    }
}
