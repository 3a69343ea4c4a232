// ABOUTME: Configuration management for the tapestry application
// ABOUTME: Handles loading configuration from YAML files and environment variable overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::OutputFormat;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Base directory for relative template paths
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("tapestry/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                serde_yaml::from_str(&contents)?
            }
            _ => Config::default(),
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local = [
            PathBuf::from("tapestry.yaml"),
            PathBuf::from(".tapestry.yaml"),
        ];

        if let Some(path) = local.into_iter().find(|path| path.exists()) {
            return Some(path);
        }

        dirs::home_dir()
            .map(|home| home.join(".tapestry").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(level) = lookup("TAPESTRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TAPESTRY_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(root) = lookup("TAPESTRY_TEMPLATE_ROOT") {
            self.templates.root = Some(PathBuf::from(root));
        }
        if let Some(timeout) = lookup("TAPESTRY_HTTP_TIMEOUT") {
            self.http.timeout = humantime_serde::re::humantime::parse_duration(&timeout)
                .map_err(|e| anyhow::anyhow!("Invalid TAPESTRY_HTTP_TIMEOUT '{}': {}", timeout, e))?;
        }
        if let Some(format) = lookup("TAPESTRY_OUTPUT_FORMAT") {
            self.output.format = match format.to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                "yaml" => OutputFormat::Yaml,
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid TAPESTRY_OUTPUT_FORMAT '{}'. Expected 'json' or 'yaml'",
                        format
                    ))
                }
            };
        }

        Ok(())
    }
}
