//! Portfolio panel widget
//!
//! Displays a scrollable table of positions with PnL coloring.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::{format_money, panel};
use crate::domain::PortfolioPosition;
use crate::pages::portfolio::EMPTY;
use crate::pages::{Loadable, PortfolioPage};
use crate::tui::theme::THEME;

/// Render the portfolio panel
pub fn render_portfolio(f: &mut Frame, area: Rect, page: &PortfolioPage) {
    let block = panel(" PORTFOLIO ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let positions = match &page.positions {
        Loadable::Loading => {
            let loading = Paragraph::new("Loading portfolio...").style(THEME.inactive_style());
            f.render_widget(loading, inner);
            return;
        }
        Loadable::Failed(message) => {
            let failed = Paragraph::new(message.as_str()).style(THEME.error_style());
            f.render_widget(failed, inner);
            return;
        }
        Loadable::Loaded(positions) if positions.is_empty() => {
            f.render_widget(Paragraph::new(EMPTY).style(THEME.inactive_style()), inner);
            return;
        }
        Loadable::Loaded(positions) => positions,
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("  {:<10}", "ASSET"), bold),
        Span::styled(format!("{:>12}", "QUANTITY"), bold),
        Span::styled(format!("{:>14}", "AVG PRICE"), bold),
        Span::styled(format!("{:>14}", "PNL"), bold),
    ]);

    // Header and total take two rows.
    let visible_rows = (inner.height as usize).saturating_sub(2);
    let start_idx = page.scroll.min(positions.len().saturating_sub(1));
    let end_idx = (start_idx + visible_rows).min(positions.len());

    let mut lines = vec![header];
    lines.extend(positions[start_idx..end_idx].iter().map(position_row));

    let total = page.total_pnl();
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<36}", "TOTAL PNL"), bold),
        Span::styled(
            format!("{:>14}", format_money(total)),
            THEME.pnl_style(!total.is_sign_negative()),
        ),
    ]));
    f.render_widget(Paragraph::new(lines), inner);

    if positions.len() > visible_rows {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(positions.len())
            .position(start_idx);
        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn position_row(position: &PortfolioPosition) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<10}", position.asset)),
        Span::raw(format!("{:>12}", position.quantity.normalize().to_string())),
        Span::raw(format!("{:>14}", format_money(position.average_price))),
        Span::styled(
            format!("{:>14}", format_money(position.pnl)),
            THEME.pnl_style(position.is_profitable()),
        ),
    ])
}
