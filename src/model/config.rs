use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "VENDORLENS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_BRAVE_KEY: &str = "BRAVE_KEY";
const ENV_SEARCH_BASE_URL: &str = "SEARCH_BASE_URL";
const ENV_SEARCH_MIN_INTERVAL: &str = "SEARCH_MIN_INTERVAL";
const ENV_LLM_API_URL: &str = "LLM_API_URL";
const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
const ENV_LLM_MODEL: &str = "LLM_MODEL";
const ENV_LLM_TEMPERATURE: &str = "LLM_TEMPERATURE";
const ENV_LLM_MAX_TOKENS: &str = "LLM_MAX_TOKENS";
const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
const ENV_FETCH_MAX_CHARS: &str = "FETCH_MAX_CHARS";
const ENV_EVENT_KEEPALIVE_SECS: &str = "EVENT_KEEPALIVE_SECS";
const ENV_EVENT_QUEUE_CAPACITY: &str = "EVENT_QUEUE_CAPACITY";

const DEFAULT_SEARCH_BASE_URL: &str = "https://api.search.brave.com";
const DEFAULT_SEARCH_MIN_INTERVAL_SECS: f64 = 1.1;
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;
const DEFAULT_LLM_MAX_TOKENS: u32 = 1500;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_MAX_CHARS: usize = 8000;
const DEFAULT_EVENT_KEEPALIVE_SECS: u64 = 15;
const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;

/// Retriever filtering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieverConfig {
    /// Extra denied hosts, added to the built-in community list.
    #[serde(default)]
    pub deny: Vec<String>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub retrievers: RetrieverConfig,
    /// Vendor keyword -> official registrable domains
    #[serde(default)]
    pub vendor_domains: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Brave subscription token; search is disabled without it
    pub api_key: Option<String>,
    pub base_url: String,
    pub min_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_chars: usize,
}

#[derive(Debug, Clone)]
pub struct EventConfig {
    pub keepalive: Duration,
    pub queue_capacity: usize,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub retrievers: RetrieverConfig,
    pub vendor_domains: BTreeMap<String, Vec<String>>,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub fetch: FetchConfig,
    pub events: EventConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retrievers: RetrieverConfig::default(),
            vendor_domains: BTreeMap::new(),
            search: SearchConfig {
                api_key: None,
                base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
                min_interval: Duration::from_secs_f64(DEFAULT_SEARCH_MIN_INTERVAL_SECS),
            },
            llm: LlmConfig {
                api_url: DEFAULT_LLM_API_URL.to_string(),
                api_key: None,
                model: DEFAULT_LLM_MODEL.to_string(),
                temperature: DEFAULT_LLM_TEMPERATURE,
                max_tokens: DEFAULT_LLM_MAX_TOKENS,
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
                max_chars: DEFAULT_FETCH_MAX_CHARS,
            },
            events: EventConfig {
                keepalive: Duration::from_secs(DEFAULT_EVENT_KEEPALIVE_SECS),
                queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            },
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Read and parse an environment variable, falling back to a default
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a non-empty environment variable
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = env_parse("PORT", 8080);
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        // Load config file
        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let min_interval_secs =
            env_parse(ENV_SEARCH_MIN_INTERVAL, DEFAULT_SEARCH_MIN_INTERVAL_SECS);
        let min_interval = if min_interval_secs.is_finite() && min_interval_secs >= 0.0 {
            Duration::from_secs_f64(min_interval_secs)
        } else {
            tracing::warn!(
                value = min_interval_secs,
                "Invalid SEARCH_MIN_INTERVAL, using default"
            );
            Duration::from_secs_f64(DEFAULT_SEARCH_MIN_INTERVAL_SECS)
        };

        Self {
            retrievers: file.retrievers,
            vendor_domains: file.vendor_domains,
            search: SearchConfig {
                api_key: env_non_empty(ENV_BRAVE_KEY),
                base_url: env_non_empty(ENV_SEARCH_BASE_URL)
                    .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
                min_interval,
            },
            llm: LlmConfig {
                api_url: env_non_empty(ENV_LLM_API_URL)
                    .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
                api_key: env_non_empty(ENV_LLM_API_KEY),
                model: env_non_empty(ENV_LLM_MODEL)
                    .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                temperature: env_parse(ENV_LLM_TEMPERATURE, DEFAULT_LLM_TEMPERATURE),
                max_tokens: env_parse(ENV_LLM_MAX_TOKENS, DEFAULT_LLM_MAX_TOKENS),
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(env_parse(
                    ENV_FETCH_TIMEOUT_SECS,
                    DEFAULT_FETCH_TIMEOUT_SECS,
                )),
                max_chars: env_parse(ENV_FETCH_MAX_CHARS, DEFAULT_FETCH_MAX_CHARS),
            },
            events: EventConfig {
                keepalive: Duration::from_secs(env_parse(
                    ENV_EVENT_KEEPALIVE_SECS,
                    DEFAULT_EVENT_KEEPALIVE_SECS,
                )),
                queue_capacity: env_parse(ENV_EVENT_QUEUE_CAPACITY, DEFAULT_EVENT_QUEUE_CAPACITY)
                    .max(1),
            },
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config_file(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config_file(contents: &str, path: &Path) -> Option<ConfigFile> {
        // Handle empty file
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file_with_vendor_domains() {
        let yaml = r#"
retrievers:
  deny:
    - glassdoor.com
vendor_domains:
  acme:
    - acme.io
    - acmecloud.com
"#;
        let parsed = Config::parse_config_file(yaml, Path::new("test.yaml")).unwrap();

        assert_eq!(parsed.retrievers.deny, vec!["glassdoor.com".to_string()]);
        assert_eq!(parsed.vendor_domains["acme"].len(), 2);
    }

    #[test]
    fn test_empty_config_file_uses_defaults() {
        let parsed = Config::parse_config_file("   \n", Path::new("empty.yaml")).unwrap();
        assert!(parsed.retrievers.deny.is_empty());
        assert!(parsed.vendor_domains.is_empty());
    }

    #[test]
    fn test_invalid_config_file_is_ignored() {
        assert!(Config::parse_config_file("retrievers: [", Path::new("bad.yaml")).is_none());
    }

    #[test]
    fn test_default_search_interval() {
        let config = Config::default();
        assert_eq!(config.search.min_interval, Duration::from_millis(1100));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
