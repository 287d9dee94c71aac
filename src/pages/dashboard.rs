use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{settle, Loadable, PageContext, PageEvent, PageTasks};
use crate::domain::{Quote, User, UserSummary};

pub const LOAD_FAILED: &str = "Could not load data. Check your authentication.";
pub const QUOTE_FAILED: &str = "Could not load market data. Check your backend server.";

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub summary: UserSummary,
    pub user: User,
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Overview(Loadable<Overview>),
    /// `Ok` on a successful poll, `Err` holds the tile failure message
    Quote(Result<Quote, String>),
}

/// Latest quote plus an independent error flag; the last good quote stays
/// on screen while a poll is failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteTile {
    pub quote: Option<Quote>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct DashboardPage {
    pub overview: Loadable<Overview>,
    pub tile: QuoteTile,
    pub symbol: String,
}

impl DashboardPage {
    pub fn mount(ctx: &PageContext, tasks: &mut PageTasks) -> Self {
        let page = Self {
            overview: Loadable::Loading,
            tile: QuoteTile::default(),
            symbol: ctx.config.market.quote_symbol.clone(),
        };
        page.load_overview(ctx, tasks);
        page.start_quote_poll(ctx, tasks);
        page
    }

    fn load_overview(&self, ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let result = tokio::try_join!(ctx.api.user_summary(), ctx.api.current_user())
                .map(|(summary, user)| Overview { summary, user });
            if let Some(state) = settle(result, LOAD_FAILED) {
                if let Loadable::Loaded(overview) = &state {
                    ctx.session.set_user(overview.user.clone());
                }
                ctx.emit(PageEvent::Dashboard(DashboardEvent::Overview(state)));
            }
        });
    }

    fn start_quote_poll(&self, ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        let symbol = self.symbol.clone();
        let every = ctx.config.polling.quote_interval();
        tasks.spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                debug!(symbol = %symbol, "polling quote");
                let update = match settle(ctx.api.quote(&symbol).await, QUOTE_FAILED) {
                    Some(Loadable::Loaded(quote)) => Ok(quote),
                    Some(Loadable::Failed(message)) => Err(message),
                    Some(Loadable::Loading) => continue,
                    // Session is being torn down; stop polling.
                    None => break,
                };
                if !ctx.emit(PageEvent::Dashboard(DashboardEvent::Quote(update))) {
                    break;
                }
            }
        });
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Overview(state) => self.overview = state,
            DashboardEvent::Quote(Ok(quote)) => {
                self.tile.quote = Some(quote);
                self.tile.error = None;
            }
            DashboardEvent::Quote(Err(message)) => self.tile.error = Some(message),
        }
    }

    /// `user.username`, then `summary.username`, then "User"
    pub fn greeting_name<'a>(&'a self, session_user: Option<&'a User>) -> &'a str {
        let loaded = self.overview.loaded();
        greeting(
            loaded.map(|o| &o.user).or(session_user),
            loaded.map(|o| &o.summary),
        )
    }
}

pub fn greeting<'a>(user: Option<&'a User>, summary: Option<&'a UserSummary>) -> &'a str {
    user.map(|u| u.username.as_str())
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            summary
                .map(|s| s.username.as_str())
                .filter(|name| !name.trim().is_empty())
        })
        .unwrap_or("User")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::harness;
    use crate::pages::PageMessage;
    use reqwest::Method;
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn next_event(rx: &mut UnboundedReceiver<PageMessage>) -> DashboardEvent {
        match rx.recv().await.map(|m| m.event) {
            Some(PageEvent::Dashboard(event)) => event,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_greeting_fallbacks() {
        let user = User {
            id: 1,
            username: "ana".into(),
            email: String::new(),
        };
        let summary = UserSummary {
            user_id: None,
            username: "summary-ana".into(),
            email: None,
            portfolios: 0,
            orders_executed: 0,
            total_volume: Decimal::ZERO,
            most_traded_asset: None,
            strategies_linked: Vec::new(),
        };
        assert_eq!(greeting(Some(&user), Some(&summary)), "ana");
        assert_eq!(greeting(None, Some(&summary)), "summary-ana");
        assert_eq!(greeting(None, None), "User");
    }

    #[tokio::test]
    async fn test_mount_loads_overview_and_quote() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = DashboardPage::mount(&h.ctx, &mut tasks);
        assert!(page.overview.is_loading());

        for _ in 0..2 {
            let event = next_event(&mut h.rx).await;
            page.apply(event);
        }
        assert_eq!(page.greeting_name(None), "demo");
        assert_eq!(page.tile.quote.as_ref().map(|q| q.symbol.as_str()), Some("IBM"));
        assert_eq!(h.ctx.session.snapshot().display_name(), Some("demo"));
    }

    #[tokio::test]
    async fn test_quote_failure_is_independent() {
        let mut h = harness();
        h.demo.fail(Method::GET, "/market-data/quote/IBM", "connection refused");
        let mut tasks = PageTasks::new();
        let mut page = DashboardPage::mount(&h.ctx, &mut tasks);

        for _ in 0..2 {
            let event = next_event(&mut h.rx).await;
            page.apply(event);
        }
        assert_eq!(page.tile.error.as_deref(), Some(QUOTE_FAILED));
        assert!(page.overview.loaded().is_some());

        page.apply(DashboardEvent::Quote(Ok(Quote {
            symbol: "IBM".into(),
            price: Decimal::ONE,
            volume: Decimal::ZERO,
        })));
        assert!(page.tile.error.is_none());
    }

    #[tokio::test]
    async fn test_overview_failure_message() {
        let mut h = harness();
        h.demo.respond(Method::GET, "/analytics/user-summary", 500, "boom");
        let mut tasks = PageTasks::new();
        let mut page = DashboardPage::mount(&h.ctx, &mut tasks);

        for _ in 0..2 {
            let event = next_event(&mut h.rx).await;
            page.apply(event);
        }
        assert_eq!(page.overview.failure(), Some(LOAD_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_polls_on_interval() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let _page = DashboardPage::mount(&h.ctx, &mut tasks);

        let mut quotes = 0;
        while quotes < 3 {
            if let DashboardEvent::Quote(_) = next_event(&mut h.rx).await {
                quotes += 1;
            }
        }
        assert_eq!(h.demo.request_count("/market-data/quote/IBM"), 3);

        tasks.abort_all();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(h.demo.request_count("/market-data/quote/IBM"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_quote_does_not_bunch_polls() {
        let mut h = harness();
        h.demo
            .stall_next("/market-data/quote/IBM", Duration::from_secs(20));
        let started = tokio::time::Instant::now();
        let mut tasks = PageTasks::new();
        let _page = DashboardPage::mount(&h.ctx, &mut tasks);

        let mut quotes = 0;
        while quotes < 3 {
            if let DashboardEvent::Quote(_) = next_event(&mut h.rx).await {
                quotes += 1;
            }
        }
        let offsets: Vec<Duration> = h
            .demo
            .request_times("/market-data/quote/IBM")
            .iter()
            .map(|at| at.duration_since(started))
            .collect();
        assert_eq!(
            offsets,
            [0, 20, 25].map(Duration::from_secs).to_vec()
        );
    }
}
