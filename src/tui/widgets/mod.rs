//! TUI Widget components
//!
//! One render function per page plus the shared chrome.

pub mod backtest;
pub mod dashboard;
pub mod footer;
pub mod form;
pub mod header;
pub mod health;
pub mod market_chart;
pub mod notifications;
pub mod popup;
pub mod portfolio;
pub mod strategies;

pub use backtest::render_backtest;
pub use dashboard::render_dashboard;
pub use footer::render_footer;
pub use form::{render_form, FormNotes};
pub use header::render_header;
pub use health::render_health;
pub use market_chart::render_market_chart;
pub use notifications::render_notifications;
pub use popup::{render_help, render_message, render_modal};
pub use portfolio::render_portfolio;
pub use strategies::render_strategies;

use ratatui::widgets::{Block, Borders};
use rust_decimal::Decimal;

use crate::tui::theme::THEME;

/// Bordered panel with the dashboard title style
pub(crate) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(THEME.title_style())
        .borders(Borders::ALL)
        .border_style(THEME.border_style())
}

/// Format currency with commas and 2 decimal places
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", sign, format_with_commas(int_part), frac_part)
}

/// Format a run of digits with commas
fn format_with_commas(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1250.75)), "$1,250.75");
        assert_eq!(format_money(dec!(1234567.5)), "$1,234,567.50");
        assert_eq!(format_money(dec!(-316.8)), "-$316.80");
        assert_eq!(format_money(dec!(0)), "$0.00");
        assert_eq!(format_money(dec!(999.999)), "$1,000.00");
    }
}
