//! Overlays: help, confirmation modal and blocking error messages

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::Modal;
use crate::tui::theme::THEME;

const HELP: &[(&str, &str)] = &[
    ("1-7", "Dashboard, Strategies, Portfolio, Notifications, Backtest, Market, Health"),
    ("Enter", "Open chart / toggle strategy / submit form"),
    ("Tab", "Next form field (Shift-Tab previous)"),
    ("d / n", "Delete / new strategy"),
    ("t / T", "Next / previous chart timeframe"),
    ("s / v", "Toggle SMA(20) / volume"),
    ("r", "Reload the current page"),
    ("L", "Sign out"),
    ("q / Esc", "Quit"),
];

/// Rect of `width` x `height` centred in `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered(area, 72, HELP.len() as u16 + 4);
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:<9}"), THEME.highlight_style()),
                Span::raw(*what),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" HELP ")
        .title_style(THEME.title_style())
        .borders(Borders::ALL)
        .border_style(THEME.border_style());
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_modal(f: &mut Frame, area: Rect, modal: &Modal) {
    let popup = centered(area, 56, 5);
    let lines = vec![
        Line::from(modal.message.as_str()),
        Line::from(Span::styled("[y] yes   [n] no", THEME.inactive_style())),
    ];
    let block = Block::default()
        .title(" CONFIRM ")
        .title_style(THEME.title_style())
        .borders(Borders::ALL)
        .border_style(THEME.highlight_style());
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

/// Blocking failure message; dismissed with Enter or Esc
pub fn render_message(f: &mut Frame, area: Rect, message: &str) {
    let popup = centered(area, 56, 5);
    let lines = vec![
        Line::from(Span::styled(message, THEME.error_style())),
        Line::from(Span::styled("[Enter] ok", THEME.inactive_style())),
    ];
    let block = Block::default()
        .title(" ERROR ")
        .title_style(THEME.error_style())
        .borders(Borders::ALL)
        .border_style(THEME.loss_style());
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
