//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::WelcomeSettings;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub discord: DiscordConfig,
    pub welcome: WelcomeConfig,
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

/// Credentials and ids; application and guild ids are only used by command registration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub token: Option<String>,
    pub application_id: Option<u64>,
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct WelcomeConfig {
    pub channel_id: Option<u64>,
    pub background: Option<PathBuf>,
    pub image_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandsConfig {
    pub greeting: GreetingConfig,
    pub fallback_reply: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GreetingConfig {
    pub name: String,
    pub description: String,
    pub reply: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "aisatsu-bot".to_string(),
        }
    }
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            background: None,
            image_enabled: true,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            greeting: GreetingConfig::default(),
            fallback_reply: "An error occurred, sorry.".to_string(),
        }
    }
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            name: "おはよう".to_string(),
            description: "Botが「おはようございます！」と返します".to_string(),
            reply: "おはようございます！ ☀️".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Override fields from process environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`. Unparseable ids are logged and ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.discord.token = Some(token);
        }

        if let Some(id) = parse_id(&lookup, "CLIENT_ID") {
            self.discord.application_id = Some(id);
        }

        if let Some(id) = parse_id(&lookup, "GUILD_ID") {
            self.discord.guild_id = Some(id);
        }

        if let Some(id) = parse_id(&lookup, "WELCOME_CHANNEL_ID") {
            self.welcome.channel_id = Some(id);
        }

        if let Some(path) = lookup("WELCOME_BACKGROUND") {
            self.welcome.background = Some(PathBuf::from(path));
        }
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.discord
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("discord.token (BOT_TOKEN)".to_string()))
    }

    /// Application id and guild id for command registration
    pub fn require_registration(&self) -> Result<(u64, u64), ConfigError> {
        let application_id = self.discord.application_id
            .ok_or_else(|| ConfigError::MissingField("discord.application-id (CLIENT_ID)".to_string()))?;
        let guild_id = self.discord.guild_id
            .ok_or_else(|| ConfigError::MissingField("discord.guild-id (GUILD_ID)".to_string()))?;
        Ok((application_id, guild_id))
    }

    pub fn welcome_settings(&self) -> WelcomeSettings {
        WelcomeSettings {
            channel_id: self.welcome.channel_id,
            background: self.welcome.background.clone(),
        }
    }
}

fn parse_id(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_round_trip_through_yaml() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = Config::from_yaml(
            "welcome:\n  channel-id: 123\n  background: assets/bg.png\n  image-enabled: false\n",
        )
        .unwrap();

        assert_eq!(config.welcome.channel_id, Some(123));
        assert_eq!(config.welcome.background, Some(PathBuf::from("assets/bg.png")));
        assert!(!config.welcome.image_enabled);
        assert_eq!(config.commands.greeting.name, "おはよう");
        assert_eq!(config.discord.token, None);
    }

    #[test]
    fn env_overrides_fields() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("BOT_TOKEN", "abc"),
            ("CLIENT_ID", "111"),
            ("GUILD_ID", "222"),
            ("WELCOME_CHANNEL_ID", " 333 "),
            ("WELCOME_BACKGROUND", "bg.jpg"),
        ]));

        assert_eq!(config.require_token().unwrap(), "abc");
        assert_eq!(config.require_registration().unwrap(), (111, 222));
        assert_eq!(
            config.welcome_settings(),
            WelcomeSettings {
                channel_id: Some(333),
                background: Some(PathBuf::from("bg.jpg")),
            }
        );
    }

    #[test]
    fn bad_ids_are_ignored() {
        let mut config = Config::default();
        config.welcome.channel_id = Some(9);
        config.apply_env_from(env(&[("WELCOME_CHANNEL_ID", "general")]));
        assert_eq!(config.welcome.channel_id, Some(9));
    }

    #[test]
    fn missing_credentials_are_errors() {
        let config = Config::default();
        assert!(matches!(config.require_token(), Err(ConfigError::MissingField(_))));
        assert!(matches!(config.require_registration(), Err(ConfigError::MissingField(_))));

        let mut empty = Config::default();
        empty.discord.token = Some(String::new());
        assert!(empty.require_token().is_err());
    }
}
