//! subgoal configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::completion::{DEFAULT_TEMPERATURE, MAX_PROMPT_CHARS, RetryPolicy};
use crate::llm::{GPT3, LLAMA2_CHAT};

/// Main subgoal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion backend selection and request shaping
    pub llm: LlmConfig,

    /// OpenAI backend settings
    pub openai: OpenAIConfig,

    /// Hugging Face backend settings
    pub huggingface: HuggingFaceConfig,

    /// Retry policy for completion calls
    pub retry: RetryConfig,

    /// HTTP listener
    pub server: ServerConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .subgoal.yml
        let local_config = PathBuf::from(".subgoal.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/subgoal/subgoal.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".subgoal.yml")];
                paths.extend(Self::user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("subgoal").join("subgoal.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Model identifier for the selected provider
    pub fn active_model(&self) -> &str {
        match self.llm.provider.as_str() {
            "huggingface" => &self.huggingface.model,
            _ => &self.llm.model,
        }
    }
}

/// Completion backend selection and request shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "huggingface")
    pub provider: String,

    /// OpenAI model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Prompts are cut to this many characters before sending
    #[serde(rename = "max-prompt-chars")]
    pub max_prompt_chars: usize,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: GPT3.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_prompt_chars: MAX_PROMPT_CHARS,
            timeout_ms: 300_000,
        }
    }
}

/// OpenAI backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Hugging Face Inference API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    /// Environment variable containing the access token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Hosted model identifier
    pub model: String,

    /// Generation length cap
    #[serde(rename = "max-new-tokens")]
    pub max_new_tokens: u32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            token_env: "HF_TOKEN".to_string(),
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: LLAMA2_CHAT.to_string(),
            max_new_tokens: 500,
        }
    }
}

/// Retry policy for completion calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts in milliseconds
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            delay_ms: policy.delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `<name>.pmt` before the embedded templates
    pub dir: Option<PathBuf>,
}

/// Provider credentials, loaded once at startup
///
/// Both values are required regardless of the selected provider so a
/// misconfigured deployment fails before it serves anything.
#[derive(Clone)]
pub struct Secrets {
    pub openai_key: String,
    pub hf_token: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_key", &"<redacted>")
            .field("hf_token", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the process environment, reading `.env` first if present
    pub fn from_env(config: &Config) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(?path, "Secrets::from_env: loaded .env"),
            Err(e) => debug!(error = %e, "Secrets::from_env: no .env loaded"),
        }
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Load secrets through an arbitrary lookup function
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(eyre::eyre!("Required secret not found. Set the {} environment variable.", name)),
            }
        };

        Ok(Self {
            openai_key: require(&config.openai.api_key_env)?,
            hf_token: require(&config.huggingface.token_env)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-3.5-turbo-1106");
        assert_eq!(config.llm.max_prompt_chars, 3700);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.delay_ms, 15_000);
        assert_eq!(config.server.port, 5000);
        assert!(config.prompts.dir.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: huggingface
  temperature: 0.7
  max-prompt-chars: 2000
  timeout-ms: 60000

openai:
  api-key-env: MY_OPENAI_KEY
  base-url: http://localhost:9000

huggingface:
  token-env: MY_HF_TOKEN
  model: mistralai/Mistral-7B-Instruct-v0.2
  max-new-tokens: 256

retry:
  max-attempts: 2
  delay-ms: 10

server:
  bind: 0.0.0.0
  port: 8080

prompts:
  dir: /etc/subgoal/prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "huggingface");
        assert_eq!(config.llm.max_prompt_chars, 2000);
        assert_eq!(config.openai.api_key_env, "MY_OPENAI_KEY");
        assert_eq!(config.huggingface.max_new_tokens, 256);
        assert_eq!(config.active_model(), "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.retry.policy(), RetryPolicy::new(2, Duration::from_millis(10)));
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.prompts.dir, Some(PathBuf::from("/etc/subgoal/prompts")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4-1106-preview
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4-1106-preview");
        assert_eq!(config.active_model(), "gpt-4-1106-preview");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.openai.api_key_env, "OPENAI_KEY");
        assert_eq!(config.huggingface.token_env, "HF_TOKEN");
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/subgoal.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_log_level_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgoal.yml");
        fs::write(&path, "log-level: warn\n").unwrap();

        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
        assert_eq!(Config::load(Some(&path)).unwrap().log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_secrets_from_lookup() {
        let config = Config::default();
        let secrets = Secrets::from_lookup(&config, lookup_from(&[("OPENAI_KEY", "sk-1"), ("HF_TOKEN", "hf_1")])).unwrap();

        assert_eq!(secrets.openai_key, "sk-1");
        assert_eq!(secrets.hf_token, "hf_1");
        assert!(!format!("{:?}", secrets).contains("sk-1"));
    }

    #[test]
    fn test_secrets_missing_openai_key_fails() {
        let config = Config::default();
        let err = Secrets::from_lookup(&config, lookup_from(&[("HF_TOKEN", "hf_1")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_KEY"));
    }

    #[test]
    fn test_secrets_missing_hf_token_fails() {
        let config = Config::default();
        let err = Secrets::from_lookup(&config, lookup_from(&[("OPENAI_KEY", "sk-1")])).unwrap_err();
        assert!(err.to_string().contains("HF_TOKEN"));
    }

    #[test]
    fn test_secrets_blank_value_counts_as_missing() {
        let config = Config::default();
        let result = Secrets::from_lookup(&config, lookup_from(&[("OPENAI_KEY", "  "), ("HF_TOKEN", "hf_1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_secrets_respect_configured_names() {
        let mut config = Config::default();
        config.openai.api_key_env = "ALT_KEY".to_string();
        config.huggingface.token_env = "ALT_TOKEN".to_string();

        let secrets = Secrets::from_lookup(&config, lookup_from(&[("ALT_KEY", "a"), ("ALT_TOKEN", "b")])).unwrap();
        assert_eq!(secrets.openai_key, "a");
        assert_eq!(secrets.hf_token, "b");
    }
}
