//! Dashboard runner
//!
//! Wires the API client, the session and the app together and drives the
//! single event loop that owns all UI state.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::prelude::*;
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::adapters::{ApiClient, BackendApi, Transport};
use crate::config::AppConfig;
use crate::error::Result;
use crate::pages::{PageContext, PageMessage};
use crate::routing::{NavCommand, Route};
use crate::session::{SessionProvider, SessionSnapshot, SharedTokenStore};
use crate::tui::app::DeskApp;
use crate::tui::event::{AppEvent, EventHandler};
use crate::tui::{init_terminal, restore_terminal, ui};

const TICK_RATE: Duration = Duration::from_millis(250);

pub struct DashboardRunner {
    app: DeskApp,
    provider: SessionProvider,
    page_rx: mpsc::UnboundedReceiver<PageMessage>,
    nav_rx: mpsc::UnboundedReceiver<NavCommand>,
    session_rx: watch::Receiver<SessionSnapshot>,
}

impl DashboardRunner {
    /// Hydrate the session from `store` and build the app on top of `transport`
    pub fn new(config: Arc<AppConfig>, transport: Arc<dyn Transport>, store: SharedTokenStore) -> Self {
        let client = ApiClient::new(transport, store.clone());
        let mut provider = SessionProvider::new(store);
        provider.attach(client.subscribe());
        let nav_rx = provider
            .take_navigation()
            .unwrap_or_else(|| mpsc::unbounded_channel().1);
        provider.hydrate();

        let handle = provider.handle();
        let session_rx = handle.subscribe();
        let (page_tx, page_rx) = mpsc::unbounded_channel();
        let ctx = PageContext::new(BackendApi::new(client), handle, config, page_tx);

        Self {
            app: DeskApp::new(ctx),
            provider,
            page_rx,
            nav_rx,
            session_rx,
        }
    }

    pub fn app(&self) -> &DeskApp {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut DeskApp {
        &mut self.app
    }

    /// Wait for one page result, navigation request or session change and
    /// apply it to the app
    pub async fn step(&mut self) {
        tokio::select! {
            Some(message) = self.page_rx.recv() => self.app.handle_page_message(message),
            Some(command) = self.nav_rx.recv() => self.app.handle_nav(command),
            Ok(()) = self.session_rx.changed() => {
                let snapshot = self.session_rx.borrow_and_update().clone();
                self.app.handle_session(snapshot);
            }
            else => {}
        }
    }

    /// Take over the terminal until the user quits
    pub async fn run(mut self, initial: Route) -> Result<()> {
        info!(route = %initial, "starting dashboard");
        self.app.navigate(initial, None);

        let mut terminal = init_terminal()?;
        let mut events = EventHandler::new(TICK_RATE);
        let outcome = self.event_loop(&mut terminal, &mut events).await;

        // Restore the terminal even when the loop failed.
        restore_terminal()?;
        self.app.quit();
        self.provider.shutdown();
        info!("dashboard stopped");
        outcome
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        events: &mut EventHandler,
    ) -> Result<()> {
        while self.app.is_running() {
            terminal.draw(|f| ui::render(f, &self.app))?;

            tokio::select! {
                Some(event) = events.next() => {
                    if let AppEvent::Key(key) = event {
                        self.app.handle_key(key);
                    }
                }
                Some(message) = self.page_rx.recv() => self.app.handle_page_message(message),
                Some(command) = self.nav_rx.recv() => self.app.handle_nav(command),
                Ok(()) = self.session_rx.changed() => {
                    let snapshot = self.session_rx.borrow_and_update().clone();
                    self.app.handle_session(snapshot);
                }
                else => break,
            }
        }
        Ok(())
    }
}
