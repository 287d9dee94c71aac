//! Command-line surface.
//!
//! `tradedesk` with no subcommand opens the dashboard; the other commands
//! run one request against the backend with the same client and session
//! the dashboard uses.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::error::{DeskError, Result};
use crate::session::{FileTokenStore, MemoryTokenStore, SharedTokenStore};

pub use commands::{CommandContext, SESSION_EXPIRED};
pub use output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "tradedesk")]
#[command(version)]
#[command(about = "Terminal dashboard for a trading-strategy backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, global = true, env = "TRADEDESK_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Backend base URL (overrides api.base_url)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Keep the session token in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Print listings as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the terminal dashboard (default)
    Dashboard {
        /// Route to open first, e.g. /strategies or /market/IBM
        #[arg(long, default_value = "/")]
        path: String,
        /// Use the built-in demo backend (sign in with demo/demo)
        #[arg(long)]
        demo: bool,
    },
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check that the backend is reachable
    Ping,
    /// Print the effective configuration as TOML
    Config,
    /// Manage strategies
    #[command(subcommand)]
    Strategies(StrategyCommands),
    /// List portfolio positions
    Portfolio,
    /// List notifications
    Notifications,
    /// Run the simulated backtest
    Backtest {
        #[arg(long)]
        asset: String,
        #[arg(long)]
        condition: String,
        #[arg(long)]
        rule: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StrategyCommands {
    /// List strategies
    List,
    /// Create an inactive strategy
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Flip a strategy between active and inactive
    Toggle { id: u64 },
    /// Delete a strategy
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Layered configuration with command-line overrides applied
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config_dir {
            Some(dir) => AppConfig::load_from(dir)?,
            None => AppConfig::load()?,
        };
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        config
            .validate()
            .map_err(|problems| DeskError::Validation(problems.join("; ")))?;
        Ok(config)
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_json_flag(self.json)
    }

    /// File-backed store unless `--ephemeral` or no data directory exists
    pub fn token_store(&self, config: &AppConfig) -> SharedTokenStore {
        if self.ephemeral {
            return MemoryTokenStore::shared();
        }
        match config.storage.resolve_token_path() {
            Some(path) => Arc::new(FileTokenStore::open(path)),
            None => {
                warn!("no data directory available, session will not persist");
                MemoryTokenStore::shared()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["tradedesk"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["tradedesk", "dashboard", "--demo", "--path", "/strategies"]);
        match cli.command {
            Some(Commands::Dashboard { path, demo }) => {
                assert_eq!(path, "/strategies");
                assert!(demo);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let cli = Cli::parse_from(["tradedesk", "strategies", "delete", "3", "--yes", "--json"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Some(Commands::Strategies(StrategyCommands::Delete { id: 3, yes: true }))
        ));
    }

    #[test]
    fn test_ephemeral_store_starts_empty() {
        let cli = Cli::parse_from(["tradedesk", "--ephemeral", "whoami"]);
        let store = cli.token_store(&AppConfig::default_config());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_base_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "tradedesk",
            "--config-dir",
            dir.path().to_str().unwrap(),
            "--base-url",
            "http://backend.test:9000",
            "ping",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.api.base_url, "http://backend.test:9000");

        let cli = Cli::parse_from(["tradedesk", "--base-url", "ftp://nope", "ping"]);
        assert!(cli.load_config().is_err());
    }
}
