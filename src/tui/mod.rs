//! Terminal User Interface module
//!
//! Renders the dashboard pages with ratatui and routes keyboard input to
//! the mounted page.

pub mod app;
pub mod event;
pub mod runner;
pub mod theme;
pub mod ui;
pub mod widgets;

#[cfg(test)]
mod tests;

pub use app::{ActivePage, DeskApp, Modal, PendingAction};
pub use event::{AppEvent, EventHandler, KeyAction};
pub use runner::DashboardRunner;
pub use theme::Theme;

use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::adapters::Transport;
use crate::config::AppConfig;
use crate::error::Result;
use crate::routing::Route;
use crate::session::SharedTokenStore;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard starting at `initial`
pub async fn run_dashboard(
    config: Arc<AppConfig>,
    transport: Arc<dyn Transport>,
    store: SharedTokenStore,
    initial: Route,
) -> Result<()> {
    DashboardRunner::new(config, transport, store)
        .run(initial)
        .await
}
