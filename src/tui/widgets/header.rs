//! Header bar: app name, navigation tabs and the signed-in user

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel;
use crate::tui::app::{DeskApp, NAV_TABS};
use crate::tui::theme::THEME;

pub fn render_header(f: &mut Frame, area: Rect, app: &DeskApp) {
    let block = panel(" TRADEDESK ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [tabs_area, user_area] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(28)]).areas(inner);

    if app.session.authenticated {
        let active = app.active_tab();
        let mut spans = Vec::with_capacity(NAV_TABS.len() * 2);
        for (idx, label) in NAV_TABS.iter().enumerate() {
            let style = if Some(idx) == active {
                THEME.selected_style()
            } else {
                THEME.text_style()
            };
            spans.push(Span::styled(format!(" {} {} ", idx + 1, label), style));
            spans.push(Span::raw(" "));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), tabs_area);
    } else {
        let title = Span::styled(app.route.title(), THEME.highlight_style());
        f.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), title])), tabs_area);
    }

    let who = match (app.session.authenticated, app.session.display_name()) {
        (true, Some(name)) => Span::styled(format!("● {name}"), THEME.profit_style()),
        (true, None) => Span::styled("● signed in", THEME.profit_style()),
        (false, _) => Span::styled("○ signed out", THEME.inactive_style()),
    };
    f.render_widget(
        Paragraph::new(Line::from(who)).alignment(ratatui::layout::Alignment::Right),
        user_area,
    );
}
