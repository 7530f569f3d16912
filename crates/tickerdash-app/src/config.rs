//! Application configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tickerdash_core::MarketHours;
use tickerdash_push::PushConfig;
use tickerdash_widgets::WidgetSettings;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::updater::UpdateInterval;

/// Default config path when neither CLI nor environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Environment variable holding a config path.
pub const CONFIG_ENV: &str = "TICKERDASH_CONFIG";

/// Which page the shell drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Widget grid with auto-update.
    #[default]
    Dashboard,
    Stocks,
    Portfolio,
    Maintenance,
    Logs,
}

impl Page {
    /// Widget mounted on a single-widget page.
    pub fn widget(&self) -> Option<&'static str> {
        match self {
            Self::Dashboard => None,
            Self::Stocks => Some("stocks"),
            Self::Portfolio => Some("portfolio"),
            Self::Maintenance => Some("maintenance"),
            Self::Logs => Some("logs"),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dashboard => "dashboard",
            Self::Stocks => "stocks",
            Self::Portfolio => "portfolio",
            Self::Maintenance => "maintenance",
            Self::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// REST backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout (ms). Default: 15,000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where persistent (local) state is kept. Session state is in memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_dir")]
    pub directory: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: default_storage_dir(),
        }
    }
}

impl StorageSettings {
    pub fn local_file(&self) -> PathBuf {
        self.directory.join("local.json")
    }
}

/// Auto-update settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterSettings {
    /// Interval used when session storage has none.
    #[serde(default)]
    pub interval: UpdateInterval,
    /// Only refresh while the market is open.
    #[serde(default = "default_market_hours_only")]
    pub market_hours_only: bool,
    #[serde(default)]
    pub market_hours: MarketHours,
}

fn default_market_hours_only() -> bool {
    true
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            interval: UpdateInterval::Off,
            market_hours_only: default_market_hours_only(),
            market_hours: MarketHours::default(),
        }
    }
}

impl UpdaterSettings {
    /// Trading-hours gate, if enabled.
    pub fn gate(&self) -> Option<MarketHours> {
        self.market_hours_only.then_some(self.market_hours)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub updater: UpdaterSettings,
    #[serde(default)]
    pub widgets: WidgetSettings,
    #[serde(default)]
    pub page: Page,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Resolve the config path: CLI argument > environment > default.
    pub fn resolve_path(cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::Config("api.base_url must not be empty".to_string()));
        }
        if self.api.timeout_ms == 0 {
            return Err(AppError::Config("api.timeout_ms must be positive".to_string()));
        }
        if self.push.reconnect_base_delay_ms > self.push.reconnect_max_delay_ms {
            return Err(AppError::Config(
                "push.reconnect_base_delay_ms exceeds reconnect_max_delay_ms".to_string(),
            ));
        }
        if self.updater.market_hours_only {
            self.updater
                .market_hours
                .validate()
                .map_err(|e| AppError::Config(e.to_string()))?;
        }
        if self.widgets.news_limit == 0 {
            return Err(AppError::Config("widgets.news_limit must be positive".to_string()));
        }
        Ok(())
    }
}
