use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Timeframe;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub market: MarketConfig,
    pub polling: PollingConfig,
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base address every request path is resolved against
    pub base_url: String,
    /// Account whose portfolio and notifications are shown
    pub user_id: u64,
    /// Optional request timeout in seconds (unset = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// Symbol shown on the dashboard quote tile
    pub quote_symbol: String,
    /// Symbol opened by the market chart page
    pub chart_symbol: String,
    /// Initial chart timeframe (1D, 1W, 1M, 3M, 1Y)
    pub default_timeframe: String,
}

impl MarketConfig {
    pub fn timeframe(&self) -> Timeframe {
        Timeframe::from_str(&self.default_timeframe).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Dashboard quote refresh interval
    pub quote_interval_secs: u64,
    /// Market chart refresh interval
    pub chart_interval_secs: u64,
}

impl PollingConfig {
    pub fn quote_interval(&self) -> Duration {
        Duration::from_secs(self.quote_interval_secs)
    }

    pub fn chart_interval(&self) -> Duration {
        Duration::from_secs(self.chart_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BacktestConfig {
    /// Fixed delay before the mock simulation answers
    pub simulated_delay_ms: u64,
}

impl BacktestConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    /// Where the session token is persisted (default: <data_dir>/tradedesk/session.json)
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_token_path(&self) -> Option<PathBuf> {
        self.token_path
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("session.json")))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for dashboard log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-user application data directory (`~/.local/share/tradedesk` on Linux)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join("tradedesk"))
}

/// Per-user configuration directory (`~/.config/tradedesk` on Linux)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("tradedesk"))
}

impl AppConfig {
    /// Load configuration from the user config directory and environment
    pub fn load() -> Result<Self, ConfigError> {
        match config_dir() {
            Some(dir) => Self::load_from(dir),
            None => Self::load_from("config"),
        }
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("api.base_url", "http://127.0.0.1:8000")?
            .set_default("api.user_id", 1)?
            .set_default("market.quote_symbol", "IBM")?
            .set_default("market.chart_symbol", "IBM")?
            .set_default("market.default_timeframe", "1D")?
            .set_default("polling.quote_interval_secs", 5)?
            .set_default("polling.chart_interval_secs", 30)?
            .set_default("backtest.simulated_delay_ms", 1500)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TRADEDESK_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TRADEDESK_API__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("TRADEDESK")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Built-in defaults, matching what `load` yields with no files present
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                user_id: 1,
                timeout_secs: None,
            },
            market: MarketConfig {
                quote_symbol: "IBM".to_string(),
                chart_symbol: "IBM".to_string(),
                default_timeframe: "1D".to_string(),
            },
            polling: PollingConfig {
                quote_interval_secs: 5,
                chart_interval_secs: 30,
            },
            backtest: BacktestConfig {
                simulated_delay_ms: 1500,
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            )),
            Err(e) => errors.push(format!("api.base_url is not a valid URL: {e}")),
        }

        if self.api.timeout_secs == Some(0) {
            errors.push("api.timeout_secs must be positive when set".to_string());
        }

        if self.market.quote_symbol.trim().is_empty() {
            errors.push("market.quote_symbol must not be empty".to_string());
        }

        if self.market.chart_symbol.trim().is_empty() {
            errors.push("market.chart_symbol must not be empty".to_string());
        }

        if Timeframe::from_str(&self.market.default_timeframe).is_err() {
            errors.push(format!(
                "market.default_timeframe must be one of 1D, 1W, 1M, 3M, 1Y, got {}",
                self.market.default_timeframe
            ));
        }

        if self.polling.quote_interval_secs == 0 || self.polling.chart_interval_secs == 0 {
            errors.push("polling intervals must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
