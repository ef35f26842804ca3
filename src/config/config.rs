//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::orchestration::{
    ExtractionMode, LinearBackoff, Normalizer, SiteTarget, DEFAULT_FAILURE_MARKERS,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::session::{SessionOptions, SESSION_ID_PLACEHOLDER};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "farescout.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Cloud browser platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Pre-warmed browser pool to draw sessions from
    pub pool_id: Option<String>,
    /// Persistent browser context (cookies, consent state)
    pub profile_id: Option<String>,
    #[serde(default)]
    pub stealth: bool,
    pub region: Option<String>,
    #[serde(default = "default_inspector_url_template")]
    pub inspector_url_template: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://api.browserbase.com".to_string()
}

fn default_inspector_url_template() -> String {
    format!("https://www.browserbase.com/sessions/{}", SESSION_ID_PLACEHOLDER)
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            pool_id: None,
            profile_id: None,
            stealth: false,
            region: None,
            inspector_url_template: default_inspector_url_template(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Web agent runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_agent_model")]
    pub model: String,
}

fn default_agent_endpoint() -> String {
    "http://localhost:3000".to_string()
}

fn default_agent_model() -> String {
    "gpt-4o".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_agent_endpoint(),
            model: default_agent_model(),
        }
    }
}

/// Search behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_extraction_mode")]
    pub extraction_mode: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_seconds: u64,
    #[serde(default = "default_results_timeout")]
    pub results_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub require_cheapest_marker: bool,
    #[serde(default = "default_failure_markers")]
    pub failure_markers: Vec<String>,
}

fn default_site() -> String {
    SiteTarget::default().name().to_string()
}

fn default_extraction_mode() -> String {
    ExtractionMode::default().to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_unit() -> u64 {
    5
}

fn default_results_timeout() -> u64 {
    45
}

fn default_true() -> bool {
    true
}

fn default_failure_markers() -> Vec<String> {
    DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            extraction_mode: default_extraction_mode(),
            max_attempts: default_max_attempts(),
            backoff_unit_seconds: default_backoff_unit(),
            results_timeout_seconds: default_results_timeout(),
            require_cheapest_marker: true,
            failure_markers: default_failure_markers(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Markdown search log; a temp file is used when unset
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

/// README snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output")]
    pub output_path: String,
    #[serde(default = "default_report_title")]
    pub title: String,
}

fn default_report_output() -> String {
    "README.md".to_string()
}

fn default_report_title() -> String {
    "Flight Price Tracker".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: default_report_output(),
            title: default_report_title(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// File the configuration came from, if any was found
    pub config_path: Option<PathBuf>,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, `farescout.toml`
    ///   and then the user config directory are tried; defaults apply when
    ///   neither exists.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => Some(expand_path(&path.to_string_lossy())),
            None => Self::discover(),
        };

        let config = match &config_path {
            Some(path) if path.exists() => Self::load_config(path)?,
            _ => Self::get_default_config(),
        };

        Ok(Self {
            config_path: config_path.filter(|p| p.exists()),
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: None,
            config,
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("farescout").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get default configuration.
    pub fn get_default_config() -> Configuration {
        Configuration::default()
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        let c = &self.config;
        match key {
            "platform.api_base" => Some(c.platform.api_base.clone()),
            "platform.pool_id" => c.platform.pool_id.clone(),
            "platform.profile_id" => c.platform.profile_id.clone(),
            "platform.region" => c.platform.region.clone(),
            "platform.inspector_url_template" => Some(c.platform.inspector_url_template.clone()),
            "agent.endpoint" => Some(c.agent.endpoint.clone()),
            "agent.model" => Some(c.agent.model.clone()),
            "search.site" => Some(c.search.site.clone()),
            "search.extraction_mode" => Some(c.search.extraction_mode.clone()),
            "logging.log_file" => c.logging.log_file.clone(),
            "logging.log_level" => Some(c.logging.log_level.clone()),
            "report.output_path" => Some(c.report.output_path.clone()),
            "report.title" => Some(c.report.title.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        let c = &self.config;
        match key {
            "platform.request_timeout_seconds" => Some(c.platform.request_timeout_seconds),
            "search.max_attempts" => Some(c.search.max_attempts as u64),
            "search.backoff_unit_seconds" => Some(c.search.backoff_unit_seconds),
            "search.results_timeout_seconds" => Some(c.search.results_timeout_seconds),
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "platform.stealth" => Some(self.config.platform.stealth),
            "search.require_cheapest_marker" => Some(self.config.search.require_cheapest_marker),
            _ => None,
        }
    }

    /// Session options for the platform
    pub fn session_options(&self) -> SessionOptions {
        let platform = &self.config.platform;
        SessionOptions {
            pool_id: platform.pool_id.clone(),
            profile_id: platform.profile_id.clone(),
            stealth: platform.stealth,
            region: platform.region.clone(),
        }
    }

    pub fn inspector_template(&self) -> &str {
        &self.config.platform.inspector_url_template
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.platform.request_timeout_seconds)
    }

    pub fn site(&self) -> Result<SiteTarget> {
        self.config
            .search
            .site
            .parse()
            .with_context(|| "Invalid [search].site")
    }

    pub fn extraction_mode(&self) -> Result<ExtractionMode> {
        self.config
            .search
            .extraction_mode
            .parse()
            .with_context(|| "Invalid [search].extraction_mode")
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.search.max_attempts
    }

    pub fn backoff(&self) -> LinearBackoff {
        LinearBackoff::new(Duration::from_secs(self.config.search.backoff_unit_seconds))
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_secs(self.config.search.results_timeout_seconds)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(
            self.config.search.failure_markers.clone(),
            self.config.search.require_cheapest_marker,
        )
    }

    /// Markdown log path with `~` expanded
    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.logging.log_file.as_deref().map(expand_path)
    }

    /// README snapshot path with `~` expanded
    pub fn report_output_path(&self) -> PathBuf {
        expand_path(&self.config.report.output_path)
    }
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigurationLoader::get_default_config();
        assert_eq!(config.platform.api_base, "https://api.browserbase.com");
        assert_eq!(config.platform.request_timeout_seconds, 60);
        assert_eq!(
            config.platform.inspector_url_template,
            "https://www.browserbase.com/sessions/{session_id}"
        );
        assert_eq!(config.search.site, "google_flights");
        assert_eq!(config.search.extraction_mode, "structured");
        assert_eq!(config.search.max_attempts, 3);
        assert_eq!(config.search.backoff_unit_seconds, 5);
        assert_eq!(config.search.results_timeout_seconds, 45);
        assert!(config.search.require_cheapest_marker);
        assert_eq!(config.search.failure_markers.len(), 3);
        assert_eq!(config.logging.log_level, "INFO");
        assert_eq!(config.report.output_path, "README.md");
    }

    #[test]
    fn test_get_methods() {
        let loader = ConfigurationLoader::from_config(Configuration::default());
        assert_eq!(loader.get_string("agent.model"), Some("gpt-4o".to_string()));
        assert_eq!(loader.get_string("platform.pool_id"), None);
        assert_eq!(loader.get_u64("search.results_timeout_seconds"), Some(45));
        assert_eq!(loader.get_bool("platform.stealth"), Some(false));
        assert_eq!(loader.get_string("nope"), None);

        assert_eq!(loader.site().unwrap(), SiteTarget::GoogleFlights);
        assert_eq!(loader.extraction_mode().unwrap(), ExtractionMode::Structured);
        assert_eq!(loader.backoff().unit(), Duration::from_secs(5));
        assert!(loader.normalizer().requires_cheapest_marker());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_content = r#"
[platform]
pool_id = "pool_flights"
profile_id = "ctx_consented"
stealth = true
region = "eu-central-1"

[search]
site = "kayak"
extraction_mode = "free_text"
max_attempts = 5
require_cheapest_marker = false
failure_markers = ["gave up"]

[report]
output_path = "~/fares/README.md"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        let loader = ConfigurationLoader::new(Some(temp_file.path())).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(temp_file.path()));

        let options = loader.session_options();
        assert_eq!(options.pool_id.as_deref(), Some("pool_flights"));
        assert_eq!(options.profile_id.as_deref(), Some("ctx_consented"));
        assert!(options.stealth);
        assert_eq!(options.region.as_deref(), Some("eu-central-1"));

        assert_eq!(loader.site().unwrap(), SiteTarget::Kayak);
        assert_eq!(loader.extraction_mode().unwrap(), ExtractionMode::FreeText);
        assert_eq!(loader.max_attempts(), 5);
        // Unset keys in a present section fall back to defaults
        assert_eq!(loader.results_timeout(), Duration::from_secs(45));
        assert_eq!(loader.config.agent.endpoint, "http://localhost:3000");

        let normalizer = loader.normalizer();
        assert!(!normalizer.requires_cheapest_marker());
        assert_eq!(normalizer.failure_markers(), ["gave up".to_string()]);

        assert!(!loader
            .report_output_path()
            .to_string_lossy()
            .starts_with('~'));
    }

    #[test]
    fn test_invalid_site_is_reported() {
        let mut config = Configuration::default();
        config.search.site = "expedia".to_string();
        let loader = ConfigurationLoader::from_config(config);
        let err = loader.site().unwrap_err();
        assert!(format!("{:#}", err).contains("expedia"));
    }

    #[test]
    fn test_malformed_toml_fails() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[search\nsite = ").unwrap();
        assert!(ConfigurationLoader::new(Some(temp_file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_uses_defaults() {
        let loader = ConfigurationLoader::new(Some(Path::new("/nonexistent/farescout.toml"))).unwrap();
        assert!(loader.config_path.is_none());
        assert_eq!(loader.max_attempts(), 3);
    }
}
