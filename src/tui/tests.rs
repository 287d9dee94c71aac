use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use reqwest::Method;

use crate::adapters::{DemoTransport, DEMO_TOKEN};
use crate::config::AppConfig;
use crate::domain::Timeframe;
use crate::pages::portfolio::PortfolioEvent;
use crate::pages::strategies::EMPTY;
use crate::pages::{Loadable, PageEvent, PageMessage};
use crate::routing::Route;
use crate::session::{MemoryTokenStore, SharedTokenStore};
use crate::tui::app::{ActivePage, DeskApp, PendingAction};
use crate::tui::runner::DashboardRunner;
use crate::tui::ui;

struct Fixture {
    runner: DashboardRunner,
    demo: Arc<DemoTransport>,
    store: SharedTokenStore,
}

fn fixture_with(demo: DemoTransport, token: Option<&str>) -> Fixture {
    let demo = Arc::new(demo);
    let store: SharedTokenStore = match token {
        Some(token) => Arc::new(MemoryTokenStore::with_token(token)),
        None => Arc::new(MemoryTokenStore::new()),
    };
    let mut config = AppConfig::default_config();
    config.backtest.simulated_delay_ms = 10;
    let runner = DashboardRunner::new(Arc::new(config), demo.clone(), store.clone());
    Fixture {
        runner,
        demo,
        store,
    }
}

fn signed_in() -> Fixture {
    fixture_with(DemoTransport::new(), Some(DEMO_TOKEN))
}

fn signed_out() -> Fixture {
    fixture_with(DemoTransport::new(), None)
}

async fn pump_until(runner: &mut DashboardRunner, done: impl Fn(&DeskApp) -> bool) {
    for _ in 0..50 {
        if done(runner.app()) {
            return;
        }
        tokio::time::timeout(Duration::from_secs(2), runner.step())
            .await
            .expect("no event arrived");
    }
    panic!("condition never reached");
}

/// Apply whatever arrives within `window`
async fn drain(runner: &mut DashboardRunner, window: Duration) {
    while tokio::time::timeout(window, runner.step()).await.is_ok() {}
}

fn press(app: &mut DeskApp, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut DeskApp, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn screen(app: &DeskApp) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
    terminal.draw(|f| ui::render(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn strategies_loaded(app: &DeskApp) -> bool {
    matches!(&app.page, ActivePage::Strategies(page) if page.list.loaded().is_some())
}

#[tokio::test]
async fn test_guard_sends_signed_out_user_to_login() {
    let mut fx = signed_out();
    let app = fx.runner.app_mut();
    app.navigate(Route::Portfolio, None);

    assert_eq!(app.route, Route::Login);
    assert!(matches!(app.page, ActivePage::Login(_)));
    assert!(screen(app).contains("SIGN IN"));
    assert!(fx.demo.requests().is_empty());
}

#[tokio::test]
async fn test_guard_sends_signed_in_user_to_dashboard() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    app.navigate(Route::Login, None);
    assert_eq!(app.route, Route::Dashboard);

    app.navigate(Route::parse("/xyz"), None);
    assert_eq!(app.route, Route::Dashboard);
}

#[tokio::test]
async fn test_dashboard_renders_greeting_and_quote() {
    let mut fx = signed_in();
    fx.runner.app_mut().navigate(Route::Dashboard, None);
    pump_until(&mut fx.runner, |app| match &app.page {
        ActivePage::Dashboard(page) => {
            page.overview.loaded().is_some() && page.tile.quote.is_some()
        }
        _ => false,
    })
    .await;

    let text = screen(fx.runner.app());
    assert!(text.contains("Welcome back, demo!"));
    assert!(text.contains("QUOTE"));
    assert!(text.contains("IBM"));
}

#[tokio::test]
async fn test_results_from_previous_mount_are_dropped() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    app.navigate(Route::Dashboard, None);
    let dashboard_generation = app.generation();
    app.navigate(Route::Portfolio, None);
    assert_eq!(app.generation(), dashboard_generation + 1);

    app.handle_page_message(PageMessage {
        generation: dashboard_generation,
        event: PageEvent::Portfolio(PortfolioEvent::Loaded(Loadable::Failed("stale".into()))),
    });
    let ActivePage::Portfolio(page) = &app.page else {
        panic!("portfolio should be mounted");
    };
    assert!(page.positions.is_loading());
}

#[tokio::test]
async fn test_unauthorized_response_returns_to_login_once() {
    let mut fx = signed_in();
    fx.demo.respond(
        Method::GET,
        "/strategies",
        401,
        r#"{"detail":"Not authenticated"}"#,
    );
    fx.runner.app_mut().navigate(Route::Strategies, None);
    let mounted = fx.runner.app().generation();

    pump_until(&mut fx.runner, |app| app.route == Route::Login).await;
    drain(&mut fx.runner, Duration::from_millis(100)).await;

    let app = fx.runner.app();
    assert_eq!(app.generation(), mounted + 1);
    assert!(matches!(app.page, ActivePage::Login(_)));
    assert!(!app.session.authenticated);
    assert!(fx.store.get().is_none());
}

#[tokio::test]
async fn test_sign_in_with_keyboard() {
    let mut fx = signed_out();
    let app = fx.runner.app_mut();
    app.navigate(Route::Login, None);
    type_text(app, "demo");
    press(app, KeyCode::Tab);
    type_text(app, "demo");
    press(app, KeyCode::Enter);

    pump_until(&mut fx.runner, |app| app.route == Route::Dashboard).await;
    assert_eq!(fx.store.get().as_deref(), Some(DEMO_TOKEN));
    assert!(fx.runner.app().session.authenticated);
}

#[tokio::test]
async fn test_letters_go_into_forms() {
    let mut fx = signed_out();
    let app = fx.runner.app_mut();
    app.navigate(Route::Login, None);
    press(app, KeyCode::Char('q'));

    assert!(app.is_running());
    assert_eq!(app.page.form().map(|form| form.value(0)), Some("q"));
    press(app, KeyCode::Esc);
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_delete_asks_for_confirmation() {
    let mut fx = signed_in();
    fx.runner.app_mut().navigate(Route::Strategies, None);
    pump_until(&mut fx.runner, strategies_loaded).await;

    let app = fx.runner.app_mut();
    press(app, KeyCode::Down);
    press(app, KeyCode::Char('d'));
    assert_eq!(
        app.modal.as_ref().map(|m| m.action),
        Some(PendingAction::DeleteStrategy(2))
    );
    assert!(screen(app).contains("Are you sure you want to delete this strategy?"));

    press(app, KeyCode::Char('n'));
    assert!(app.modal.is_none());
    assert_eq!(fx.demo.request_count("/strategies/2"), 0);

    press(app, KeyCode::Char('d'));
    press(app, KeyCode::Char('y'));
    pump_until(&mut fx.runner, |app| match &app.page {
        ActivePage::Strategies(page) => page.list.loaded().is_some_and(|list| list.len() == 1),
        _ => false,
    })
    .await;
    assert_eq!(fx.demo.request_count("/strategies/2"), 1);
}

#[tokio::test]
async fn test_empty_strategy_list_message() {
    let mut fx = fixture_with(DemoTransport::new().with_strategies(vec![]), Some(DEMO_TOKEN));
    fx.runner.app_mut().navigate(Route::Strategies, None);
    pump_until(&mut fx.runner, strategies_loaded).await;

    assert!(screen(fx.runner.app()).contains(EMPTY));
}

#[tokio::test]
async fn test_logout_through_modal() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    app.navigate(Route::Dashboard, None);
    press(app, KeyCode::Char('L'));
    assert_eq!(app.modal.as_ref().map(|m| m.action), Some(PendingAction::Logout));

    press(app, KeyCode::Char('y'));
    assert_eq!(app.route, Route::Login);
    assert!(fx.store.get().is_none());
}

#[tokio::test]
async fn test_backtest_validation_shown_inline() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    app.navigate(Route::Backtest, None);
    for value in ["PETR4", "RSI < 30", "buy", "2024-02-01", "2024-01-01"] {
        type_text(app, value);
        press(app, KeyCode::Tab);
    }
    press(app, KeyCode::Enter);

    assert!(screen(app).contains("The start date must be before the end date."));
    assert!(fx.demo.requests().is_empty());
}

#[tokio::test]
async fn test_chart_keys() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    press(app, KeyCode::Char('6'));
    assert_eq!(app.route, Route::MarketChart("IBM".into()));

    press(app, KeyCode::Char('t'));
    press(app, KeyCode::Char('s'));
    let ActivePage::MarketChart(page) = &app.page else {
        panic!("chart should be mounted");
    };
    assert_eq!(page.timeframe, Timeframe::OneWeek);
    assert!(page.show_sma);
}

#[tokio::test]
async fn test_help_overlay_and_quit() {
    let mut fx = signed_in();
    let app = fx.runner.app_mut();
    app.navigate(Route::Health, None);

    press(app, KeyCode::Char('?'));
    assert!(app.show_help);
    assert!(screen(app).contains("HELP"));
    press(app, KeyCode::Char('x'));
    assert!(!app.show_help);

    press(app, KeyCode::Char('q'));
    assert!(!app.is_running());
    assert_eq!(app.active_tasks(), 0);
}
