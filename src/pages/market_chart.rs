use rust_decimal::Decimal;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{settle, Loadable, PageContext, PageEvent, PageTasks};
use crate::domain::{MarketSeries, Timeframe};

pub const LOAD_FAILED: &str = "Failed to load market data. Try again.";
pub const SMA_PERIOD: usize = 20;

#[derive(Debug, Clone)]
pub enum MarketChartEvent {
    Loaded(Timeframe, Loadable<MarketSeries>),
}

#[derive(Debug)]
pub struct MarketChartPage {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub series: Loadable<MarketSeries>,
    pub show_sma: bool,
    pub show_volume: bool,
}

impl MarketChartPage {
    pub fn mount(symbol: &str, ctx: &PageContext, tasks: &mut PageTasks) -> Self {
        let page = Self {
            symbol: symbol.to_uppercase(),
            timeframe: ctx.config.market.timeframe(),
            series: Loadable::Loading,
            show_sma: false,
            show_volume: true,
        };
        page.start_poll(ctx, tasks);
        page
    }

    /// Fetch now and then every chart interval for the current timeframe
    fn start_poll(&self, ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        let symbol = self.symbol.clone();
        let timeframe = self.timeframe;
        let every = ctx.config.polling.chart_interval();
        tasks.spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                debug!(symbol = %symbol, timeframe = %timeframe, "polling market series");
                let result = ctx.api.market_series(&symbol, timeframe).await;
                let Some(state) = settle(result, LOAD_FAILED) else {
                    break;
                };
                if !ctx.emit(PageEvent::MarketChart(MarketChartEvent::Loaded(timeframe, state))) {
                    break;
                }
            }
        });
    }

    /// Switch timeframe; the previous poll is replaced by a fresh one
    pub fn set_timeframe(&mut self, timeframe: Timeframe, ctx: &PageContext, tasks: &mut PageTasks) {
        if timeframe == self.timeframe {
            return;
        }
        tasks.abort_all();
        self.timeframe = timeframe;
        self.series = Loadable::Loading;
        self.start_poll(ctx, tasks);
    }

    pub fn next_timeframe(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        let next = self.timeframe.next();
        self.set_timeframe(next, ctx, tasks);
    }

    pub fn toggle_sma(&mut self) {
        self.show_sma = !self.show_sma;
    }

    pub fn toggle_volume(&mut self) {
        self.show_volume = !self.show_volume;
    }

    pub fn apply(&mut self, event: MarketChartEvent) {
        let MarketChartEvent::Loaded(timeframe, state) = event;
        // A response for a timeframe the user already left.
        if timeframe != self.timeframe {
            return;
        }
        self.series = state;
    }

    /// Last close, or "N/A" when nothing is loaded
    pub fn last_price_label(&self) -> String {
        self.series
            .loaded()
            .and_then(MarketSeries::last_price)
            .map(|price| format!("${:.2}", price))
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn latest_sma(&self) -> Option<Decimal> {
        self.series
            .loaded()
            .and_then(|series| series.latest_sma(SMA_PERIOD))
    }
}
