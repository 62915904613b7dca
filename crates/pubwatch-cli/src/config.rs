//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pubwatch_zbmath::SnapshotFormat;
use serde::Deserialize;

/// Global configuration for pubwatch
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub zbmath: ZbmathConfig,
    pub files: FilesConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZbmathConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub link_base: String,
}

impl Default for ZbmathConfig {
    fn default() -> Self {
        let sync = pubwatch_zbmath::Config::default();
        Self {
            base_url: sync.base_url,
            api_key: std::env::var("ZBMATH_API_KEY").ok(),
            link_base: sync.link_base,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub roster: PathBuf,
    pub prior: PathBuf,
    pub output_dir: PathBuf,
    /// May contain `{date}`
    pub full_stem: String,
    pub new_stem: String,
    pub format: SnapshotFormat,
}

impl Default for FilesConfig {
    fn default() -> Self {
        let sync = pubwatch_zbmath::Config::default();
        Self {
            roster: sync.roster_path,
            prior: sync.prior_path,
            output_dir: sync.output_dir,
            full_stem: sync.full_stem,
            new_stem: sync.new_stem,
            format: sync.format,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Minimum gap between author requests
    pub request_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let sync = pubwatch_zbmath::Config::default();
        Self {
            request_interval_ms: u64::try_from(sync.request_interval.as_millis())
                .unwrap_or(u64::MAX),
            timeout_secs: sync.request_timeout.as_secs(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./pubwatch.toml (current directory)
    /// 2. ~/.config/pubwatch/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("pubwatch.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "pubwatch") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Pipeline configuration as described by this file, before CLI overrides.
    pub fn sync_config(&self) -> pubwatch_zbmath::Config {
        pubwatch_zbmath::Config {
            base_url: self.zbmath.base_url.clone(),
            api_key: self.zbmath.api_key.clone(),
            link_base: self.zbmath.link_base.clone(),
            request_interval: Duration::from_millis(self.http.request_interval_ms),
            request_timeout: Duration::from_secs(self.http.timeout_secs),
            roster_path: self.files.roster.clone(),
            prior_path: self.files.prior.clone(),
            output_dir: self.files.output_dir.clone(),
            full_stem: self.files.full_stem.clone(),
            new_stem: self.files.new_stem.clone(),
            format: self.files.format,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.files.roster, PathBuf::from("authors.csv"));
        assert_eq!(config.files.prior, PathBuf::from("old_publications.csv"));
        assert_eq!(config.files.format, SnapshotFormat::Csv);
        assert_eq!(config.http.request_interval_ms, 1500);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("PUBWATCH_TEST_KEY", "k-123");
        assert_eq!(expand_env_var("${PUBWATCH_TEST_KEY}"), Some("k-123".to_string()));
        std::env::remove_var("PUBWATCH_TEST_KEY");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[zbmath]
base_url = "http://localhost:8080/api/v1"
api_key = "literal-key"

[files]
roster = "conf/roster.csv"
output_dir = "/tmp/pubs"
format = "parquet"

[http]
request_interval_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.zbmath.api_key.as_deref(), Some("literal-key"));
        assert_eq!(config.files.format, SnapshotFormat::Parquet);
        assert_eq!(config.http.timeout_secs, 30);

        let sync = config.sync_config();
        assert_eq!(sync.base_url, "http://localhost:8080/api/v1");
        assert_eq!(sync.roster_path, PathBuf::from("conf/roster.csv"));
        assert_eq!(sync.output_dir, PathBuf::from("/tmp/pubs"));
        assert_eq!(sync.prior_path, PathBuf::from("old_publications.csv"));
        assert_eq!(sync.request_interval, Duration::from_millis(250));
        assert_eq!(sync.link_base, "https://zbmath.org/");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = toml::from_str::<Config>("[files]\nformat = \"xlsx\"\n").unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }
}
