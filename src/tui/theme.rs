//! Theme and color definitions for the dashboard
//!
//! Cyan borders, green for profit and active strategies, red for losses and
//! errors.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::NotificationKind;

/// Theme configuration for the dashboard
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color (cyan)
    pub border: Color,
    /// Title color
    pub title: Color,
    /// Profit color (green)
    pub profit: Color,
    /// Loss color (red)
    pub loss: Color,
    /// Highlight/accent color (yellow)
    pub highlight: Color,
    /// Inactive/dim color
    pub inactive: Color,
    /// Normal text color
    pub text: Color,
    /// Error messages
    pub error: Color,
    /// Informational flashes
    pub info: Color,
    /// Selected row background
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Color::Cyan,
            title: Color::Cyan,
            profit: Color::Green,
            loss: Color::Red,
            highlight: Color::Yellow,
            inactive: Color::DarkGray,
            text: Color::White,
            error: Color::LightRed,
            info: Color::LightBlue,
            selection: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Get style for borders
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get style for titles
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    /// Get style for profit values
    pub fn profit_style(&self) -> Style {
        Style::default().fg(self.profit)
    }

    /// Get style for loss values
    pub fn loss_style(&self) -> Style {
        Style::default().fg(self.loss)
    }

    /// Get style for highlighted text
    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Get style for inactive/dim text
    pub fn inactive_style(&self) -> Style {
        Style::default().fg(self.inactive)
    }

    /// Get style for normal text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for PnL based on value (non-negative = profit, negative = loss)
    pub fn pnl_style(&self, is_profit: bool) -> Style {
        if is_profit {
            self.profit_style()
        } else {
            self.loss_style()
        }
    }

    pub fn status_style(&self, is_active: bool) -> Style {
        if is_active {
            self.profit_style()
        } else {
            self.inactive_style()
        }
    }

    pub fn notification_style(&self, kind: &NotificationKind) -> Style {
        match kind {
            NotificationKind::Alert => self.highlight_style(),
            NotificationKind::Success => self.profit_style(),
            NotificationKind::Info => self.info_style(),
            NotificationKind::Error => self.loss_style(),
            NotificationKind::Other(_) => self.inactive_style(),
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);
