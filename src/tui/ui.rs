//! Main UI rendering logic
//!
//! Orchestrates the layout and renders the mounted page between the header
//! and the footer, then any overlay on top.

use ratatui::{
    layout::{Constraint, Layout},
    text::Span,
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::{ActivePage, DeskApp};
use crate::tui::theme::THEME;
use crate::tui::widgets::{self, FormNotes};

/// Render the entire UI
pub fn render(f: &mut Frame, app: &DeskApp) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header with navigation
        Constraint::Min(6),    // Page body
        Constraint::Length(1), // Footer status bar
    ])
    .split(f.area());

    widgets::render_header(f, chunks[0], app);

    let body = chunks[1];
    match &app.page {
        ActivePage::Loading => {
            let waiting = Paragraph::new(Span::styled(" Loading...", THEME.inactive_style()));
            f.render_widget(waiting, body);
        }
        ActivePage::Login(page) => {
            let notes = FormNotes {
                error: page.error.as_deref(),
                flash: page.flash.as_deref(),
                busy: page.submitting.then_some("Signing in..."),
            };
            widgets::render_form(f, body, " SIGN IN ", &page.form, notes);
        }
        ActivePage::Register(page) => {
            let notes = FormNotes {
                error: page.error.as_deref(),
                busy: page.submitting.then_some("Creating account..."),
                ..FormNotes::default()
            };
            widgets::render_form(f, body, " CREATE ACCOUNT ", &page.form, notes);
        }
        ActivePage::CreateStrategy(page) => {
            let notes = FormNotes {
                error: page.error.as_deref(),
                busy: page.submitting.then_some("Saving..."),
                ..FormNotes::default()
            };
            widgets::render_form(f, body, " NEW STRATEGY ", &page.form, notes);
        }
        ActivePage::Dashboard(page) => widgets::render_dashboard(f, body, page, &app.session),
        ActivePage::Strategies(page) => widgets::render_strategies(f, body, page),
        ActivePage::Portfolio(page) => widgets::render_portfolio(f, body, page),
        ActivePage::Notifications(page) => widgets::render_notifications(f, body, page),
        ActivePage::Backtest(page) => widgets::render_backtest(f, body, page),
        ActivePage::MarketChart(page) => widgets::render_market_chart(f, body, page),
        ActivePage::Health(page) => widgets::render_health(f, body, page),
    }

    widgets::render_footer(f, chunks[2], app);

    let screen = f.area();
    if app.show_help {
        widgets::render_help(f, screen);
    }
    if let Some(modal) = &app.modal {
        widgets::render_modal(f, screen, modal);
    }
}
