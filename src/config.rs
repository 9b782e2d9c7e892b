//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use tale_proto::{irc_eq, ChannelExt};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config field {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
    #[error("invalid sibling_nick_pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Bot configuration, immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Nickname the bot registers with.
    pub nickname: String,
    /// Server hostname or IP literal.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Channels to join. Normalized to a leading `#` on load.
    pub channels: Vec<String>,
    /// Path to the narrative response table.
    pub narratives: String,
    /// Admin credentials.
    #[serde(default)]
    pub admins: Vec<AdminUser>,
    /// Minimum spacing between outbound lines, in milliseconds.
    #[serde(default = "default_send_gap_ms")]
    pub send_gap_ms: u64,
    /// Extra hold on the send path after an auth attempt, in milliseconds.
    #[serde(default = "default_auth_throttle_ms")]
    pub auth_throttle_ms: u64,
    /// How long a NAMES reply can answer a pending mention, in seconds.
    #[serde(default = "default_mention_window_secs")]
    pub mention_window_secs: u64,
    /// Capacity of the authed-admin set.
    #[serde(default = "default_max_authed_admins")]
    pub max_authed_admins: usize,
    /// Capacity of the ignore list.
    #[serde(default = "default_max_ignored")]
    pub max_ignored: usize,
    /// Nick pattern identifying sibling bot instances whose traffic is
    /// dropped to avoid reply loops.
    #[serde(default = "default_sibling_nick_pattern")]
    pub sibling_nick_pattern: String,
}

/// One admin credential pair.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    /// Admin nickname (compared IRC-case-insensitively).
    pub name: String,
    /// Password (compared exactly).
    pub password: String,
}

fn default_send_gap_ms() -> u64 {
    100
}

fn default_auth_throttle_ms() -> u64 {
    200
}

fn default_mention_window_secs() -> u64 {
    5
}

fn default_max_authed_admins() -> usize {
    10
}

fn default_max_ignored() -> usize {
    32
}

fn default_sibling_nick_pattern() -> String {
    "^[A-Za-z]{4}[0-9]{4}$".to_string()
}

impl BotConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.nickname.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "nickname",
                reason: "must not be empty".into(),
            });
        }
        if self.channels.is_empty() {
            return Err(ConfigError::Invalid {
                field: "channels",
                reason: "at least one channel is required".into(),
            });
        }

        for channel in &mut self.channels {
            let name = channel.trim();
            *channel = if name.starts_with('#') {
                name.to_string()
            } else {
                format!("#{name}")
            };
            if !channel.is_channel_name() {
                return Err(ConfigError::Invalid {
                    field: "channels",
                    reason: format!("unjoinable channel name {channel}"),
                });
            }
        }

        for i in 0..self.channels.len() {
            for j in (i + 1)..self.channels.len() {
                if irc_eq(&self.channels[i], &self.channels[j]) {
                    return Err(ConfigError::Invalid {
                        field: "channels",
                        reason: format!("duplicate channel {}", self.channels[j]),
                    });
                }
            }
        }

        for admin in &self.admins {
            if admin.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "admins",
                    reason: "admin name must not be empty".into(),
                });
            }
        }

        // Fail at startup rather than at dispatch time.
        regex::Regex::new(&self.sibling_nick_pattern).map_err(|source| ConfigError::Pattern {
            pattern: self.sibling_nick_pattern.clone(),
            source,
        })?;

        Ok(self)
    }

    /// Index of a configured channel, compared IRC-case-insensitively.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.channels.iter().position(|c| irc_eq(c, name))
    }
}
