use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel;
use crate::pages::{HealthPage, Loadable};
use crate::tui::theme::THEME;

pub fn render_health(f: &mut Frame, area: Rect, page: &HealthPage) {
    let status = match &page.status {
        Loadable::Loading => Span::styled("checking...", THEME.inactive_style()),
        Loadable::Loaded(message) => {
            Span::styled(format!("reachable ({message})"), THEME.profit_style())
        }
        Loadable::Failed(message) => Span::styled(message.clone(), THEME.error_style()),
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(" Backend  "),
            Span::styled(page.base_url.as_str(), THEME.highlight_style()),
        ]),
        Line::from(vec![Span::raw(" Status   "), status]),
    ];
    f.render_widget(Paragraph::new(lines).block(panel(" HEALTH ")), area);
}
