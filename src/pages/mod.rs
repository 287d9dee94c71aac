//! Page state machines.
//!
//! Each page loads its own data through [`BackendApi`] when mounted, keeps
//! a local loading/loaded/failed state and knows nothing about rendering.
//! Work started by a page is owned by the [`PageTasks`] of that mount and
//! results come back as [`PageMessage`]s tagged with the mount generation,
//! so anything that finishes after the page is gone is dropped.

pub mod backtest;
pub mod create_strategy;
pub mod dashboard;
pub mod form;
pub mod health;
pub mod login;
pub mod market_chart;
pub mod notifications;
pub mod portfolio;
pub mod register;
pub mod strategies;

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapters::BackendApi;
use crate::config::AppConfig;
use crate::error::Result;
use crate::routing::Route;
use crate::session::SessionHandle;

pub use backtest::BacktestPage;
pub use create_strategy::CreateStrategyPage;
pub use dashboard::DashboardPage;
pub use form::{FormState, TextField};
pub use health::HealthPage;
pub use login::LoginPage;
pub use market_chart::MarketChartPage;
pub use notifications::NotificationsPage;
pub use portfolio::PortfolioPage;
pub use register::RegisterPage;
pub use strategies::StrategiesPage;

/// Mount counter; bumped every time a page is (re)mounted
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Loaded(T),
    /// Holds the static sentence shown to the user
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Apply the page error policy to a backend result.
///
/// 401s return `None`: the API client has already cleared the credential
/// and the session owner is redirecting, so the page stays silent.
pub fn settle<T>(result: Result<T>, failure: &str) -> Option<Loadable<T>> {
    match result {
        Ok(value) => Some(Loadable::Loaded(value)),
        Err(e) if e.is_unauthorized() => None,
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "page request failed");
            Some(Loadable::Failed(failure.to_string()))
        }
    }
}

/// Background work belonging to one page mount; aborted on drop
#[derive(Default)]
pub struct PageTasks {
    handles: Vec<JoinHandle<()>>,
}

impl PageTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    /// Tasks that have not completed yet
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn abort_all(&mut self) {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        if count > 0 {
            debug!(count, "aborted page tasks");
        }
    }
}

impl Drop for PageTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Result of a page handling an event or a user action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageAction {
    #[default]
    None,
    /// Go to another route, optionally carrying a one-shot flash message
    Navigate(Route, Option<String>),
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    Dashboard(dashboard::DashboardEvent),
    Strategies(strategies::StrategiesEvent),
    CreateStrategy(create_strategy::CreateStrategyEvent),
    Portfolio(portfolio::PortfolioEvent),
    Notifications(notifications::NotificationsEvent),
    Backtest(backtest::BacktestEvent),
    MarketChart(market_chart::MarketChartEvent),
    Health(health::HealthEvent),
    Login(login::LoginEvent),
    Register(register::RegisterEvent),
}

#[derive(Debug, Clone)]
pub struct PageMessage {
    pub generation: Generation,
    pub event: PageEvent,
}

/// Everything a page needs to start work
#[derive(Clone)]
pub struct PageContext {
    pub api: BackendApi,
    pub session: SessionHandle,
    pub config: Arc<AppConfig>,
    tx: mpsc::UnboundedSender<PageMessage>,
    generation: Generation,
}

impl PageContext {
    pub fn new(
        api: BackendApi,
        session: SessionHandle,
        config: Arc<AppConfig>,
        tx: mpsc::UnboundedSender<PageMessage>,
    ) -> Self {
        Self {
            api,
            session,
            config,
            tx,
            generation: 0,
        }
    }

    /// Same context, tagged for a new mount
    pub fn for_generation(&self, generation: Generation) -> Self {
        Self {
            generation,
            ..self.clone()
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report back to the UI loop; false once the loop has gone away
    pub fn emit(&self, event: PageEvent) -> bool {
        self.tx
            .send(PageMessage {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use std::time::Duration;

    #[test]
    fn test_settle_policy() {
        let ok: Option<Loadable<u8>> = settle(Ok(3), "nope");
        assert_eq!(ok, Some(Loadable::Loaded(3)));

        let failed: Option<Loadable<u8>> =
            settle(Err(DeskError::Network("down".into())), "Failed to load.");
        assert_eq!(failed, Some(Loadable::Failed("Failed to load.".into())));

        let silent: Option<Loadable<u8>> = settle(Err(DeskError::Unauthorized), "ignored");
        assert!(silent.is_none());
    }

    #[tokio::test]
    async fn test_tasks_abort_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        {
            let mut tasks = PageTasks::new();
            tasks.spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                let _ = tx.send(1);
            });
            assert_eq!(tasks.active(), 1);
        }
        // The sender lived inside the aborted task, so the channel closes.
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_context_tags_generation() {
        let harness = testing::harness();
        let mut rx = harness.rx;
        let ctx = harness.ctx.for_generation(7);
        assert!(ctx.emit(PageEvent::Health(health::HealthEvent::Pinged(Loadable::Loading))));
        assert_eq!(rx.try_recv().unwrap().generation, 7);
    }
}
