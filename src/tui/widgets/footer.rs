//! Footer status bar widget
//!
//! Current route on the left, key hints for the mounted page on the right.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::{ActivePage, DeskApp};
use crate::tui::theme::THEME;

pub fn key_hints(page: &ActivePage) -> &'static str {
    match page {
        ActivePage::Loading => "Checking session...",
        ActivePage::Login(_) => "Tab next field  Enter sign in  F2 create account  Esc quit",
        ActivePage::Register(_) => "Tab next field  Enter register  F2/Esc back to sign in",
        ActivePage::CreateStrategy(_) => "Tab next field  Enter create  Esc cancel",
        ActivePage::Backtest(_) => "Tab next field  Enter run  Esc back",
        ActivePage::Dashboard(_) => "1-7 pages  Enter chart  r reload  L sign out  ? help  q quit",
        ActivePage::Strategies(_) => "↑↓ select  Enter toggle  d delete  n new  r reload  q quit",
        ActivePage::Portfolio(_) | ActivePage::Notifications(_) => "↑↓ scroll  r reload  q quit",
        ActivePage::MarketChart(_) => "t/T timeframe  s SMA  v volume  r reload  q quit",
        ActivePage::Health(_) => "r ping again  q quit",
    }
}

/// Render the footer status bar
pub fn render_footer(f: &mut Frame, area: Rect, app: &DeskApp) {
    let [left, right] =
        Layout::horizontal([Constraint::Length(24), Constraint::Min(10)]).areas(area);

    let route = Line::from(vec![
        Span::raw("  "),
        Span::styled(app.route.path(), THEME.highlight_style()),
    ]);
    f.render_widget(Paragraph::new(route), left);

    let hints = Line::from(Span::styled(key_hints(&app.page), THEME.inactive_style()));
    f.render_widget(
        Paragraph::new(hints).alignment(ratatui::layout::Alignment::Right),
        right,
    );
}
