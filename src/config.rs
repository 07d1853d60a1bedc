use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::export::{default_colors, ColorTable, DEFAULT_NODE_COLOR};
use crate::graph::MAX_PATH_HOPS;
use crate::llm::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GRAPHRAG_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graphrag: GraphragConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

/// GraphRAG-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphragConfig {
    /// Knowledge file (.json / .yaml) or a directory of them.
    pub knowledge_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Graph query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Analyses kept in the LRU cache; 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Language-model client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `<base_url>/chat/completions`, keeping any path prefix of the base URL.
    pub fn chat_completions_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url)
            .with_context(|| format!("llm.base_url is not a valid URL: {}", self.base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("chat/completions")
            .context("Failed to build chat completions URL")
    }
}

/// Visualization export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_node_color")]
    pub default_color: String,
    #[serde(default = "default_colors")]
    pub colors: BTreeMap<String, String>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            default_color: default_node_color(),
            colors: default_colors(),
        }
    }
}

impl VisualizationConfig {
    pub fn color_table(&self) -> ColorTable {
        ColorTable::new(self.colors.clone(), self.default_color.clone())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_hops() -> usize {
    MAX_PATH_HOPS
}

fn default_cache_capacity() -> usize {
    128
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_system_prompt() -> String {
    "You are a domain expert providing accurate, detailed explanations grounded in the supplied knowledge.".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("knowledge_graph.json")
}

fn default_node_color() -> String {
    DEFAULT_NODE_COLOR.to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in GRAPHRAG_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
    }

    /// Defaults for every section, reading knowledge from `knowledge_path`.
    /// Used when no config file is available.
    pub fn with_knowledge_path(knowledge_path: PathBuf) -> Self {
        Self {
            graphrag: GraphragConfig {
                knowledge_path,
                log_level: default_log_level(),
            },
            query: QueryConfig::default(),
            llm: LlmConfig::default(),
            visualization: VisualizationConfig::default(),
        }
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.query.max_hops == 0 {
            anyhow::bail!("query.max_hops must be greater than 0");
        }

        if self.llm.max_attempts == 0 {
            anyhow::bail!("llm.max_attempts must be greater than 0");
        }

        let url = self.llm.chat_completions_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("llm.base_url must use http or https: {}", self.llm.base_url);
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0.0 and 2.0");
        }

        Ok(())
    }

    /// Get the knowledge file or directory
    pub fn knowledge_path(&self) -> &Path {
        &self.graphrag.knowledge_path
    }

    /// API key for the language model, read from the configured variable.
    /// Only LLM commands need it.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable.",
                self.llm.api_key_env
            )
        })
    }
}
