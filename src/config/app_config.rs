use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matcher: MatcherConfig,
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Matching engine knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Directory holding strategy files
    pub strategy_dir: String,
    /// Strategy file extension
    pub extension: String,
    /// Minimum similarity for a match to be accepted
    pub threshold: f64,
    /// Match against the persistent strategy table instead of the
    /// in-process corpus
    pub use_store: bool,
}

/// Embedding provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// OpenAI API key; empty means unconfigured
    pub api_key: String,
    /// API base URL override
    pub base_url: Option<String>,
    /// Default embedding model; empty keeps the provider's default
    pub model: String,
}

/// Persistent store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; `None` disables the store tier
    pub url: Option<String>,
    /// Embedding vector dimension
    pub dimension: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy_dir: "strategies".to_string(),
            extension: ".md".to_string(),
            threshold: 0.75,
            use_store: false,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: String::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            dimension: 1536,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("INTENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.matcher.extension, ".md");
        assert_eq!(config.matcher.threshold, 0.75);
        assert!(!config.matcher.use_store);
        assert_eq!(config.database.dimension, 1536);
        assert!(config.database.url.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
