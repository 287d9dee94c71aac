//! Strategies list widget

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{panel, popup};
use crate::pages::strategies::EMPTY;
use crate::pages::{Loadable, StrategiesPage};
use crate::tui::theme::THEME;

pub fn render_strategies(f: &mut Frame, area: Rect, page: &StrategiesPage) {
    let block = panel(" STRATEGIES ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(flash) = &page.flash {
        lines.push(Line::from(Span::styled(flash.as_str(), THEME.profit_style())));
        lines.push(Line::default());
    }

    match &page.list {
        Loadable::Loading => {
            lines.push(Line::from(Span::styled("Loading strategies...", THEME.inactive_style())));
        }
        Loadable::Failed(message) => {
            lines.push(Line::from(Span::styled(message.as_str(), THEME.error_style())));
        }
        Loadable::Loaded(list) if list.is_empty() => {
            lines.push(Line::from(Span::styled(EMPTY, THEME.inactive_style())));
            lines.push(Line::from(Span::styled(
                "Press n to create your first strategy.",
                THEME.inactive_style(),
            )));
        }
        Loadable::Loaded(list) => {
            let width = list.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
            for (idx, strategy) in list.iter().enumerate() {
                let selected = idx == page.selected;
                let row_style = if selected {
                    THEME.selected_style()
                } else {
                    THEME.text_style()
                };
                lines.push(Line::from(vec![
                    Span::styled(if selected { "> " } else { "  " }, row_style),
                    Span::styled(format!("{:<width$}", strategy.name), row_style),
                    Span::raw("  "),
                    Span::styled(
                        format!("[{}]", strategy.status_label()),
                        THEME.status_style(strategy.is_active),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        strategy.description.clone().unwrap_or_default(),
                        THEME.inactive_style(),
                    ),
                ]));
            }
        }
    }

    f.render_widget(Paragraph::new(lines), inner);

    if let Some(message) = &page.popup {
        popup::render_message(f, area, message);
    }
}
