use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use tradedesk::adapters::{DemoTransport, ReqwestTransport, Transport};
use tradedesk::cli::{self, Cli, CommandContext, Commands};
use tradedesk::config::AppConfig;
use tradedesk::logging;
use tradedesk::routing::Route;
use tradedesk::session::{MemoryTokenStore, SharedTokenStore};
use tradedesk::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(cli.load_config()?);

    match cli.command.clone() {
        None => run_dashboard(&cli, config, "/", false).await,
        Some(Commands::Dashboard { path, demo }) => {
            run_dashboard(&cli, config, &path, demo).await
        }
        Some(command) => {
            logging::init_console_logging();
            let transport = ReqwestTransport::new(&config.api.base_url, config.api.timeout())?;
            let store = cli.token_store(&config);
            let ctx = CommandContext::new(config, Arc::new(transport), store, cli.output_mode());
            cli::commands::execute(command, &ctx).await
        }
    }
}

async fn run_dashboard(
    cli: &Cli,
    config: Arc<AppConfig>,
    path: &str,
    demo: bool,
) -> anyhow::Result<()> {
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init_file_logging(&config.logging);

    let (transport, store): (Arc<dyn Transport>, SharedTokenStore) = if demo {
        info!("starting with the built-in demo backend");
        (Arc::new(DemoTransport::new()), MemoryTokenStore::shared())
    } else {
        let transport = ReqwestTransport::new(&config.api.base_url, config.api.timeout())?;
        (Arc::new(transport), cli.token_store(&config))
    };

    info!(base_url = %config.api.base_url, path, "starting dashboard");
    let result = tui::run_dashboard(config, transport, store, Route::parse(path)).await;
    if let Err(e) = &result {
        error!("dashboard exited with error: {}", e);
    }
    Ok(result?)
}
