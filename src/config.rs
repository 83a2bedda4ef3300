use crate::llm::LlmSettings;
use anyhow::{anyhow, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/neural/config.toml";
/// Overrides the configuration file location
const CONFIG_PATH_ENV: &str = "NEURAL_CONFIG";

const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
const DEFAULT_SYSTEM: &str = "You are Neural, an intelligent and helpful Discord bot. \
You're enthusiastic and always try to be helpful. \
Keep responses concise but informative. \
If someone asks about your capabilities, mention that you can chat, \
help with questions, and provide information on various topics.";

/// Bot configuration
///
/// Read from an optional TOML file, then overridden by environment variables.
#[derive(Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub llm: Llm,
    pub history: History,
    pub logging: Logging,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct General {
    pub discord_token: String,
    pub command_prefix: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Llm {
    pub api_key: String,
    pub chat_url: String,
    pub model_name: String,
    pub system: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct History {
    /// Maximum number of turns, user and assistant combined, kept per user.
    pub max_turns: usize,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Logging {
    pub log_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins if set.
    pub filter: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            command_prefix: "!".to_owned(),
        }
    }
}

impl Default for Llm {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            chat_url: DEFAULT_CHAT_URL.to_owned(),
            model_name: DEFAULT_MODEL.to_owned(),
            system: DEFAULT_SYSTEM.to_owned(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_seconds: 60,
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self { max_turns: 20 }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("bot.log"),
            filter: "info".to_owned(),
        }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    /// Load the configuration file (if any), apply the environment and validate the result.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::from_file(&path).await?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse the configuration file at `path`.  A missing file yields the defaults.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow!(
                    "Could not open configuration at `{}`: {}",
                    path.to_string_lossy(),
                    e
                ))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })
    }

    /// Override file settings with environment variables.  Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = var("DISCORD_TOKEN") {
            self.general.discord_token = token;
        }
        if let Some(prefix) = var("BOT_PREFIX") {
            self.general.command_prefix = prefix;
        }
        if let Some(key) = var("GROQ_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(model) = var("AI_MODEL") {
            self.llm.model_name = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.discord_token.trim().is_empty() {
            return Err(anyhow!("DISCORD_TOKEN not found in configuration"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(anyhow!("GROQ_API_KEY not found in configuration"));
        }
        if self.general.command_prefix.trim().is_empty() {
            return Err(anyhow!("Command prefix must not be blank"));
        }
        if self.history.max_turns == 0 {
            return Err(anyhow!("history.max_turns must be at least 1"));
        }
        // reqwest treats a zero timeout as "fail immediately"
        if self.llm.timeout_seconds == 0 {
            return Err(anyhow!("llm.timeout_seconds must be at least 1"));
        }
        Ok(())
    }
}

impl<'a> Llm {
    pub fn as_llm_settings(&'a self) -> LlmSettings<'a> {
        LlmSettings {
            model_name: &self.model_name,
            system: &self.system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_neural() {
        let config = Config::default();
        assert_eq!(config.general.command_prefix, "!");
        assert_eq!(config.llm.model_name, "llama-3.1-70b-versatile");
        assert_eq!(config.llm.max_tokens, 1000);
        assert_eq!(config.history.max_turns, 20);
        assert_eq!(config.logging.log_path, PathBuf::from("bot.log"));
    }

    #[test]
    fn env_overrides_and_validates() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("DISCORD_TOKEN", "token"),
            ("GROQ_API_KEY", "key"),
            ("BOT_PREFIX", ";"),
            ("AI_MODEL", "mixtral-8x7b-32768"),
        ]));

        assert_eq!(config.general.discord_token, "token");
        assert_eq!(config.llm.api_key, "key");
        assert_eq!(config.general.command_prefix, ";");
        assert_eq!(config.llm.model_name, "mixtral-8x7b-32768");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("BOT_PREFIX", "  "), ("AI_MODEL", "")]));
        assert_eq!(config.general.command_prefix, "!");
        assert_eq!(config.llm.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn missing_secrets_fail_validation() {
        let mut config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));

        config.apply_env(env(&[("DISCORD_TOKEN", "token")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn zero_history_cap_is_rejected() {
        let mut config = Config::default();
        config.apply_env(env(&[("DISCORD_TOKEN", "t"), ("GROQ_API_KEY", "k")]));
        config.history.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.apply_env(env(&[("DISCORD_TOKEN", "t"), ("GROQ_API_KEY", "k")]));
        config.llm.timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.history.max_turns, 20);
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\ntemperature = 0.2\n\n[history]\nmax_turns = 6\n",
        )
        .unwrap();

        let config = Config::from_file(&path).await.unwrap();
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.history.max_turns, 6);
        assert_eq!(config.llm.chat_url, DEFAULT_CHAT_URL);
        assert_eq!(config.general.command_prefix, "!");
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history\nmax_turns = ").unwrap();

        let err = Config::from_file(&path).await.err().unwrap();
        assert!(err.to_string().contains("Could not parse configuration"));
    }
}
