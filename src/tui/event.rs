//! Event handling for the dashboard
//!
//! Terminal input and ticks arrive on one channel; page results and session
//! changes are selected on separately by the runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// Terminal events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Regular tick for UI refresh
    Tick,
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Owns the tick task and the blocking input thread
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    running: Arc<AtomicBool>,
}

impl EventHandler {
    /// Start producing events; stops when the handler is dropped
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tick_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        let input_running = Arc::clone(&running);
        std::thread::spawn(move || {
            while input_running.load(Ordering::SeqCst) {
                if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                    continue;
                }
                let forwarded = match event::read() {
                    // Windows reports releases too.
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });

        Self { rx, running }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Key action on pages without a text form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Show help
    Help,
    /// Ask to sign out
    Logout,
    /// Jump to navigation tab `n` (1-based)
    Jump(u8),
    Up,
    Down,
    /// Enter/space on the current item
    Select,
    Delete,
    New,
    Reload,
    NextTimeframe,
    PrevTimeframe,
    ToggleSma,
    ToggleVolume,
    /// No action
    None,
}

impl From<KeyEvent> for KeyAction {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('?') => KeyAction::Help,
            KeyCode::Char('L') => KeyAction::Logout,
            KeyCode::Char(c @ '1'..='7') => KeyAction::Jump(c as u8 - b'0'),
            KeyCode::Up | KeyCode::Char('k') => KeyAction::Up,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::Down,
            KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Select,
            KeyCode::Char('d') | KeyCode::Delete => KeyAction::Delete,
            KeyCode::Char('n') => KeyAction::New,
            KeyCode::Char('r') => KeyAction::Reload,
            KeyCode::Char('t') | KeyCode::Right => KeyAction::NextTimeframe,
            KeyCode::Char('T') | KeyCode::Left => KeyAction::PrevTimeframe,
            KeyCode::Char('s') => KeyAction::ToggleSma,
            KeyCode::Char('v') => KeyAction::ToggleVolume,
            _ => KeyAction::None,
        }
    }
}
