//! Market chart widget
//!
//! Price, optional SMA(20) and optional volume are drawn as text sparklines.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{format_money, panel};
use crate::domain::{sma, MarketSeries, Timeframe};
use crate::pages::market_chart::SMA_PERIOD;
use crate::pages::{Loadable, MarketChartPage};
use crate::tui::theme::THEME;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One bar per value, scaled between the min and max of the last `width`
/// values
pub fn sparkline(values: &[Decimal], width: usize) -> String {
    let tail = &values[values.len().saturating_sub(width)..];
    let floats: Vec<f64> = tail.iter().filter_map(|v| v.to_f64()).collect();
    let (min, max) = floats
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;

    floats
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                BARS[BARS.len() / 2]
            } else {
                let level = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}

fn timeframe_tabs(current: Timeframe) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for tf in Timeframe::ALL {
        let style = if tf == current {
            THEME.selected_style()
        } else {
            THEME.inactive_style()
        };
        spans.push(Span::styled(format!(" {} ", tf.as_str()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn chart_lines(page: &MarketChartPage, series: &MarketSeries, width: usize) -> Vec<Line<'static>> {
    let closes = series.closes();
    let mut lines = vec![
        Line::from(vec![
            Span::raw(" Price  "),
            Span::styled(sparkline(&closes, width), THEME.profit_style()),
        ]),
    ];

    if page.show_sma {
        let averages: Vec<Decimal> = sma(&closes, SMA_PERIOD).into_iter().flatten().collect();
        let line = if averages.is_empty() {
            Span::styled("not enough data", THEME.inactive_style())
        } else {
            Span::styled(sparkline(&averages, width), THEME.highlight_style())
        };
        lines.push(Line::from(vec![Span::raw(" SMA    "), line]));
    }

    if page.show_volume {
        let volumes: Vec<Decimal> = series.values.iter().map(|bar| bar.volume).collect();
        lines.push(Line::from(vec![
            Span::raw(" Volume "),
            Span::styled(sparkline(&volumes, width), THEME.info_style()),
        ]));
    }

    if let (Some(first), Some(last)) = (series.values.first(), series.values.last()) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                " {} to {}  ({} points)",
                first.label(page.timeframe),
                last.label(page.timeframe),
                series.values.len()
            ),
            THEME.inactive_style(),
        )));
    }
    lines
}

pub fn render_market_chart(f: &mut Frame, area: Rect, page: &MarketChartPage) {
    let title = format!(" {} · {} ", page.symbol, page.timeframe.label());
    let block = panel(&title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sma_label = match page.latest_sma() {
        Some(value) => format_money(value),
        None => "N/A".to_string(),
    };
    let mut lines = vec![
        timeframe_tabs(page.timeframe),
        Line::default(),
        Line::from(vec![
            Span::raw(" Last price "),
            Span::styled(page.last_price_label(), THEME.highlight_style()),
            Span::raw(format!("   SMA({SMA_PERIOD}) ")),
            Span::styled(
                if page.show_sma { sma_label } else { "off".to_string() },
                THEME.inactive_style(),
            ),
            Span::raw("   Volume "),
            Span::styled(
                if page.show_volume { "on" } else { "off" },
                THEME.inactive_style(),
            ),
        ]),
        Line::default(),
    ];

    // Leaves room for the row labels.
    let width = (inner.width as usize).saturating_sub(9).max(1);
    match &page.series {
        Loadable::Loading => lines.push(Line::from(Span::styled(
            " Loading market data...",
            THEME.inactive_style(),
        ))),
        Loadable::Failed(message) => lines.push(Line::from(Span::styled(
            format!(" {message}"),
            THEME.error_style(),
        ))),
        Loadable::Loaded(series) => lines.extend(chart_lines(page, series, width)),
    }

    f.render_widget(Paragraph::new(lines), inner);
}
