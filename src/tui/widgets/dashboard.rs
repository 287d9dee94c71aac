//! Dashboard page widget
//!
//! Greeting, account summary and the live quote tile.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{format_money, panel};
use crate::pages::dashboard::Overview;
use crate::pages::{DashboardPage, Loadable};
use crate::session::SessionSnapshot;
use crate::tui::theme::THEME;

pub fn render_dashboard(f: &mut Frame, area: Rect, page: &DashboardPage, session: &SessionSnapshot) {
    let [greeting_area, body] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(4)]).areas(area);
    let [summary_area, quote_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);

    let name = page.greeting_name(session.user.as_ref());
    let greeting = Line::from(vec![
        Span::raw(" Welcome back, "),
        Span::styled(format!("{name}!"), THEME.title_style()),
    ]);
    f.render_widget(Paragraph::new(greeting), greeting_area);

    let summary = match &page.overview {
        Loadable::Loading => vec![Line::from(Span::styled("Loading...", THEME.inactive_style()))],
        Loadable::Failed(message) => vec![Line::from(Span::styled(
            message.as_str(),
            THEME.error_style(),
        ))],
        Loadable::Loaded(overview) => summary_lines(overview),
    };
    f.render_widget(Paragraph::new(summary).block(panel(" ACCOUNT ")), summary_area);

    let tile = &page.tile;
    let mut quote = Vec::new();
    match &tile.quote {
        Some(q) => {
            quote.push(Line::from(vec![
                Span::styled(q.symbol.clone(), THEME.title_style()),
                Span::raw("  "),
                Span::styled(format_money(q.price), THEME.highlight_style()),
            ]));
            quote.push(Line::from(format!("Volume  {}", q.volume.round_dp(0))));
        }
        None if tile.error.is_none() => {
            quote.push(Line::from(Span::styled("Loading quote...", THEME.inactive_style())));
        }
        None => {}
    }
    if let Some(error) = &tile.error {
        quote.push(Line::from(Span::styled(error.as_str(), THEME.error_style())));
    }
    let title = format!(" QUOTE · {} ", page.symbol);
    f.render_widget(Paragraph::new(quote).block(panel(&title)), quote_area);
}

fn summary_lines(overview: &Overview) -> Vec<Line<'static>> {
    let summary = &overview.summary;
    let strategies = if summary.strategies_linked.is_empty() {
        "None".to_string()
    } else {
        summary.strategies_linked.join(", ")
    };
    vec![
        Line::from(format!("Email              {}", overview.user.email)),
        Line::from(format!("Portfolios         {}", summary.portfolios)),
        Line::from(format!("Orders executed    {}", summary.orders_executed)),
        Line::from(format!("Total volume       {}", format_money(summary.total_volume))),
        Line::from(format!(
            "Most traded asset  {}",
            summary.most_traded_asset.as_deref().unwrap_or("N/A")
        )),
        Line::from(format!("Strategies linked  {strategies}")),
    ]
}
