//! Text form rendering shared by the sign-in, register, new strategy and
//! backtest pages.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::panel;
use crate::pages::FormState;
use crate::tui::theme::THEME;

/// Messages shown under the fields
#[derive(Debug, Default, Clone, Copy)]
pub struct FormNotes<'a> {
    pub error: Option<&'a str>,
    pub flash: Option<&'a str>,
    /// Shown while a submission is in flight
    pub busy: Option<&'a str>,
}

pub fn form_lines<'a>(form: &'a FormState, notes: FormNotes<'a>) -> Vec<Line<'a>> {
    let width = form
        .fields
        .iter()
        .map(|field| field.label.len())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(form.fields.len() + 4);
    if let Some(flash) = notes.flash {
        lines.push(Line::from(Span::styled(flash, THEME.info_style())));
        lines.push(Line::default());
    }

    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            THEME.highlight_style()
        } else {
            THEME.text_style()
        };
        let value = if field.value().is_empty() {
            Span::styled(field.placeholder, THEME.inactive_style())
        } else {
            Span::styled(field.display(), THEME.text_style())
        };
        let mut spans = vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<width$}  ", field.label), label_style),
            value,
        ];
        if focused {
            spans.push(Span::styled("▏", THEME.highlight_style()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    if let Some(busy) = notes.busy {
        lines.push(Line::from(Span::styled(busy, THEME.highlight_style())));
    }
    if let Some(error) = notes.error {
        lines.push(Line::from(Span::styled(error, THEME.error_style())));
    }
    lines
}

pub fn render_form(f: &mut Frame, area: Rect, title: &str, form: &FormState, notes: FormNotes<'_>) {
    let block = panel(title);
    let paragraph = Paragraph::new(form_lines(form, notes))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
