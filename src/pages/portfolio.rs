use rust_decimal::Decimal;

use super::{settle, Loadable, PageContext, PageEvent, PageTasks};
use crate::domain::PortfolioPosition;

pub const LOAD_FAILED: &str = "Failed to load portfolio data.";
pub const EMPTY: &str = "No positions in your portfolio yet.";

#[derive(Debug, Clone)]
pub enum PortfolioEvent {
    Loaded(Loadable<Vec<PortfolioPosition>>),
}

#[derive(Debug)]
pub struct PortfolioPage {
    pub positions: Loadable<Vec<PortfolioPosition>>,
    pub scroll: usize,
}

impl PortfolioPage {
    pub fn mount(ctx: &PageContext, tasks: &mut PageTasks) -> Self {
        let user_id = ctx.config.api.user_id;
        let task_ctx = ctx.clone();
        tasks.spawn(async move {
            let result = task_ctx.api.portfolio(user_id).await;
            if let Some(state) = settle(result, LOAD_FAILED) {
                task_ctx.emit(PageEvent::Portfolio(PortfolioEvent::Loaded(state)));
            }
        });
        Self {
            positions: Loadable::Loading,
            scroll: 0,
        }
    }

    pub fn apply(&mut self, event: PortfolioEvent) {
        match event {
            PortfolioEvent::Loaded(state) => {
                self.positions = state;
                self.scroll = 0;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.loaded().is_some_and(Vec::is_empty)
    }

    /// Sum of the PnL column
    pub fn total_pnl(&self) -> Decimal {
        self.positions
            .loaded()
            .map(|positions| positions.iter().map(|p| p.pnl).sum())
            .unwrap_or_default()
    }

    pub fn scroll_down(&mut self) {
        let len = self.positions.loaded().map(Vec::len).unwrap_or(0);
        if self.scroll < len.saturating_sub(1) {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
