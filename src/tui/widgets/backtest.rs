//! Backtest form and its (simulated) result

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::form::{render_form, FormNotes};
use super::{format_money, panel};
use crate::pages::BacktestPage;
use crate::tui::theme::THEME;

pub fn render_backtest(f: &mut Frame, area: Rect, page: &BacktestPage) {
    let [form_area, result_area] =
        Layout::vertical([Constraint::Min(9), Constraint::Length(5)]).areas(area);

    let notes = FormNotes {
        error: page.error.as_deref(),
        busy: page.running.then_some("Running simulation..."),
        ..FormNotes::default()
    };
    render_form(f, form_area, " BACKTEST ", &page.form, notes);

    let lines = match &page.result {
        Some(result) => vec![
            Line::from(vec![
                Span::raw(" P&L     "),
                Span::styled(
                    format_money(result.pnl),
                    THEME.pnl_style(!result.pnl.is_sign_negative()),
                ),
            ]),
            Line::from(format!(" Orders  {}", result.orders)),
            Line::from(vec![
                Span::raw(" Status  "),
                if result.success {
                    Span::styled("Success", THEME.profit_style())
                } else {
                    Span::styled("Failed", THEME.loss_style())
                },
            ]),
        ],
        None => vec![Line::from(Span::styled(
            " Fill in the form and press Enter to run.",
            THEME.inactive_style(),
        ))],
    };
    f.render_widget(Paragraph::new(lines).block(panel(" RESULT ")), result_area);
}
