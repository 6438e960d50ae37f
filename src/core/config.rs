use crate::core::analysis::Anchoring;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FONPARAM_URL: &str = "https://api.fonparam.com";

/// Where fund records and price histories are read from.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Fonparam,
    Local,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FonparamProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocalProviderConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fonparam: Option<FonparamProviderConfig>,
    pub local: Option<LocalProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fonparam: Some(FonparamProviderConfig {
                base_url: DEFAULT_FONPARAM_URL.to_string(),
            }),
            local: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_fund_ttl")]
    pub fund_ttl_minutes: u64,
    #[serde(default = "default_history_ttl")]
    pub history_ttl_minutes: u64,
}

fn default_fund_ttl() -> u64 {
    10
}

fn default_history_ttl() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fund_ttl_minutes: default_fund_ttl(),
            history_ttl_minutes: default_history_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn fund_ttl(&self) -> Duration {
        Duration::from_secs(self.fund_ttl_minutes.saturating_mul(60))
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub anchoring: Anchoring,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when it does
    /// not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fonx", "fonx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fonx", "fonx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn fonparam_base_url(&self) -> &str {
        self.providers
            .fonparam
            .as_ref()
            .map_or(DEFAULT_FONPARAM_URL, |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
source: local
providers:
  fonparam:
    base_url: "http://example.com/api"
  local:
    path: "/tmp/funds.json"
cache:
  fund_ttl_minutes: 5
analysis:
  anchoring: fixed
data_path: "/tmp/fonx"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.source, SourceKind::Local);
        assert_eq!(config.fonparam_base_url(), "http://example.com/api");
        assert_eq!(
            config.providers.local.as_ref().map(|l| l.path.as_str()),
            Some("/tmp/funds.json")
        );
        assert_eq!(config.cache.fund_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.history_ttl_minutes, 30);
        assert_eq!(config.analysis.anchoring, Anchoring::Fixed);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fonx")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.source, SourceKind::Fonparam);
        assert_eq!(config.fonparam_base_url(), DEFAULT_FONPARAM_URL);
        assert_eq!(config.cache.fund_ttl_minutes, 10);
        assert_eq!(config.cache.history_ttl(), Duration::from_secs(30 * 60));
        assert_eq!(config.analysis.anchoring, Anchoring::Drift);
        assert!(config.providers.local.is_none());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let config: AppConfig =
            serde_yaml::from_str("cache:\n  fund_ttl_minutes: 18446744073709551615\n").unwrap();
        assert_eq!(config.cache.fund_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "source: [not, a, source]").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
