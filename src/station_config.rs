//! Station configuration.
//!
//! Settings are read from `station.toml` and layered as file → environment
//! → CLI. The file is looked up in this order:
//! 1. an explicit `--config` path
//! 2. `./.scanstation/station.toml`
//! 3. `<config dir>/scanstation/station.toml` (e.g. `~/.config` on Linux)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! base_url = "http://192.168.0.10:8000"
//! timeout_secs = 10
//! order_path = "/"
//! chat_id = "123456"
//!
//! [scanner]
//! mode = "sequence"
//! default_station = "gluing"
//!
//! [order]
//! delivery_types = ["Самовывоз", "Город", "Регионы"]
//! regions = ["Адыгея", "Ростовская область"]
//! max_photo_bytes = 5242880
//!
//! [logging]
//! level = "info"
//! json = false
//! directory = "/var/log/scanstation"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::CaptureMode;
use crate::protocol::Station;

pub const CONFIG_DIR_NAME: &str = ".scanstation";
pub const CONFIG_FILE_NAME: &str = "station.toml";

pub const ENV_SERVER_URL: &str = "SCANSTATION_SERVER_URL";
pub const ENV_CHAT_ID: &str = "SCANSTATION_CHAT_ID";
pub const ENV_MODE: &str = "SCANSTATION_MODE";

/// Connection settings for the workflow server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Keeps submit buttons from staying disabled
    /// when a request never resolves.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Path the order form posts to.
    #[serde(default = "default_order_path")]
    pub order_path: String,
    /// Telegram chat that receives a copy of submitted orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_order_path() -> String {
    "/".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            order_path: default_order_path(),
            chat_id: None,
        }
    }
}

/// Scanner page behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerSettings {
    #[serde(default)]
    pub mode: CaptureMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_station: Option<Station>,
}

/// Order entry options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettings {
    #[serde(default = "default_delivery_types")]
    pub delivery_types: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: u64,
}

fn default_delivery_types() -> Vec<String> {
    vec![
        "Самовывоз".to_string(),
        "Город".to_string(),
        "Регионы".to_string(),
    ]
}

fn default_max_photo_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            delivery_types: default_delivery_types(),
            regions: Vec::new(),
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rolling log files. Stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

/// The complete station.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationToml {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scanner: ScannerSettings,
    #[serde(default)]
    pub order: OrderSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StationToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse station.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize station.toml")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !(self.server.base_url.starts_with("http://")
            || self.server.base_url.starts_with("https://"))
        {
            warnings.push(format!(
                "Invalid server.base_url '{}': must start with http:// or https://",
                self.server.base_url
            ));
        }
        if self.server.timeout_secs == 0 {
            warnings.push("server.timeout_secs is 0: requests would fail immediately".to_string());
        }
        if !self.server.order_path.starts_with('/') {
            warnings.push(format!(
                "server.order_path '{}' should start with '/'",
                self.server.order_path
            ));
        }
        if self.order.delivery_types.is_empty() {
            warnings.push("order.delivery_types is empty".to_string());
        }
        if self.order.max_photo_bytes == 0 {
            warnings.push("order.max_photo_bytes is 0: no photo can be attached".to_string());
        }

        warnings
    }
}

/// Candidate config file locations, most specific first.
pub fn config_search_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("scanstation").join(CONFIG_FILE_NAME));
    }
    paths
}

/// Resolved configuration: file settings with environment and CLI
/// overrides applied.
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// File the settings came from, `None` when running on defaults.
    pub source: Option<PathBuf>,
    pub toml: StationToml,
}

impl StationConfig {
    /// Locate and load the configuration, then apply environment overrides.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (source, toml) = match explicit {
            Some(path) => (Some(path.to_path_buf()), StationToml::load(path)?),
            None => match config_search_paths(cwd).into_iter().find(|p| p.exists()) {
                Some(path) => {
                    let toml = StationToml::load(&path)?;
                    (Some(path), toml)
                }
                None => (None, StationToml::default()),
            },
        };

        let mut config = Self { source, toml };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml(toml: StationToml) -> Self {
        Self { source: None, toml }
    }

    /// Apply `SCANSTATION_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_SERVER_URL)
            && !url.is_empty()
        {
            self.toml.server.base_url = url;
        }
        if let Ok(chat_id) = std::env::var(ENV_CHAT_ID)
            && !chat_id.is_empty()
        {
            self.toml.server.chat_id = Some(chat_id);
        }
        if let Ok(mode) = std::env::var(ENV_MODE)
            && !mode.is_empty()
        {
            self.toml.scanner.mode = mode
                .parse()
                .with_context(|| format!("Invalid {} value", ENV_MODE))?;
        }
        Ok(())
    }

    /// Apply CLI overrides.
    pub fn with_overrides(mut self, server: Option<String>, mode: Option<CaptureMode>) -> Self {
        if let Some(url) = server {
            self.toml.server.base_url = url;
        }
        if let Some(mode) = mode {
            self.toml.scanner.mode = mode;
        }
        self
    }

    pub fn server(&self) -> &ServerSettings {
        &self.toml.server
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.toml.scanner.mode
    }

    pub fn order(&self) -> &OrderSettings {
        &self.toml.order
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.toml.logging
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [ENV_SERVER_URL, ENV_CHAT_ID, ENV_MODE] {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_parse_empty() {
        let toml = StationToml::parse("").unwrap();
        assert_eq!(toml.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(toml.server.timeout_secs, 10);
        assert_eq!(toml.server.order_path, "/");
        assert_eq!(toml.scanner.mode, CaptureMode::Sequence);
        assert_eq!(toml.order.max_photo_bytes, 5 * 1024 * 1024);
        assert_eq!(toml.logging.level, "info");
    }

    #[test]
    fn test_parse_full() {
        let content = r#"
[server]
base_url = "http://10.0.0.5:8000"
timeout_secs = 3
chat_id = "-100200"

[scanner]
mode = "per_key"
default_station = "sewing"

[order]
delivery_types = ["Самовывоз", "Регионы"]
regions = ["Адыгея"]

[logging]
level = "debug"
json = true
"#;
        let toml = StationToml::parse(content).unwrap();
        assert_eq!(toml.server.base_url, "http://10.0.0.5:8000");
        assert_eq!(toml.server.timeout_secs, 3);
        assert_eq!(toml.server.chat_id.as_deref(), Some("-100200"));
        assert_eq!(toml.scanner.mode, CaptureMode::PerKey);
        assert_eq!(toml.scanner.default_station, Some(Station::Sewing));
        assert_eq!(toml.order.regions, vec!["Адыгея"]);
        assert!(toml.logging.json);
    }

    #[test]
    fn test_parse_invalid_mode() {
        assert!(StationToml::parse("[scanner]\nmode = \"burst\"\n").is_err());
    }

    #[test]
    fn test_validate_default_is_clean() {
        assert!(StationToml::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut toml = StationToml::default();
        toml.server.base_url = "factory.local".to_string();
        toml.server.timeout_secs = 0;
        toml.order.delivery_types.clear();
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("factory.local"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        let mut toml = StationToml::default();
        toml.server.base_url = "http://example.test".to_string();
        toml.save(&path).unwrap();

        let loaded = StationToml::load(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://example.test");
    }

    #[test]
    fn test_discover_prefers_project_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[server]\nbase_url = \"http://project.test\"\n").unwrap();

        let config = StationConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert_eq!(config.server().base_url, "http://project.test");
    }

    #[test]
    fn test_discover_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(StationConfig::discover(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var(ENV_SERVER_URL, "http://env.test");
            std::env::set_var(ENV_MODE, "per_key");
            std::env::set_var(ENV_CHAT_ID, "42");
        }
        let mut config = StationConfig::from_toml(StationToml::default());
        config.apply_env().unwrap();
        clear_env();

        assert_eq!(config.server().base_url, "http://env.test");
        assert_eq!(config.capture_mode(), CaptureMode::PerKey);
        assert_eq!(config.server().chat_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_invalid_env_mode_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        unsafe { std::env::set_var(ENV_MODE, "burst") };
        let mut config = StationConfig::from_toml(StationToml::default());
        let result = config.apply_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = StationConfig::from_toml(StationToml::default())
            .with_overrides(Some("http://cli.test".to_string()), Some(CaptureMode::PerKey));
        assert_eq!(config.server().base_url, "http://cli.test");
        assert_eq!(config.capture_mode(), CaptureMode::PerKey);
    }
}
