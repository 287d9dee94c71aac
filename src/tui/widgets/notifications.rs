use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel;
use crate::pages::notifications::EMPTY;
use crate::pages::{Loadable, NotificationsPage};
use crate::tui::theme::THEME;

pub fn render_notifications(f: &mut Frame, area: Rect, page: &NotificationsPage) {
    let block = panel(" NOTIFICATIONS ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let items = match &page.items {
        Loadable::Loading => {
            f.render_widget(
                Paragraph::new("Loading notifications...").style(THEME.inactive_style()),
                inner,
            );
            return;
        }
        Loadable::Failed(message) => {
            f.render_widget(Paragraph::new(message.as_str()).style(THEME.error_style()), inner);
            return;
        }
        Loadable::Loaded(items) if items.is_empty() => {
            f.render_widget(Paragraph::new(EMPTY).style(THEME.inactive_style()), inner);
            return;
        }
        Loadable::Loaded(items) => items,
    };

    // Two rows per notification.
    let per_page = (inner.height as usize / 2).max(1);
    let start = page.scroll.min(items.len().saturating_sub(1));
    let mut lines = Vec::with_capacity(per_page * 2);
    for item in items.iter().skip(start).take(per_page) {
        let style = THEME.notification_style(&item.kind);
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", item.kind.marker()), style),
            Span::styled(item.message.clone(), THEME.text_style()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {} · {}", item.source, item.timestamp),
            THEME.inactive_style(),
        )));
    }
    f.render_widget(Paragraph::new(lines), inner);
}
