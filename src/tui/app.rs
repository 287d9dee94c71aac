//! Dashboard application state
//!
//! Owns the current route, the mounted page and the background work that
//! page started. Every navigation goes through the route guard, bumps the
//! mount generation and drops the previous page's tasks.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::pages::strategies::DELETE_CONFIRM;
use crate::pages::{
    BacktestPage, CreateStrategyPage, DashboardPage, FormState, Generation, HealthPage, LoginPage,
    MarketChartPage, NotificationsPage, PageAction, PageContext, PageEvent, PageMessage, PageTasks,
    PortfolioPage, RegisterPage, StrategiesPage,
};
use crate::routing::{self, GuardDecision, NavCommand, Route};
use crate::session::SessionSnapshot;
use crate::tui::event::KeyAction;

pub const LOGOUT_CONFIRM: &str = "Sign out of this session?";

/// Labels of the numbered navigation tabs, in key order
pub const NAV_TABS: [&str; 7] = [
    "Dashboard",
    "Strategies",
    "Portfolio",
    "Notifications",
    "Backtest",
    "Market",
    "Health",
];

/// The page currently on screen
#[derive(Debug)]
pub enum ActivePage {
    /// Waiting for the session to hydrate
    Loading,
    Login(LoginPage),
    Register(RegisterPage),
    Dashboard(DashboardPage),
    Strategies(StrategiesPage),
    CreateStrategy(CreateStrategyPage),
    Portfolio(PortfolioPage),
    Notifications(NotificationsPage),
    Backtest(BacktestPage),
    MarketChart(MarketChartPage),
    Health(HealthPage),
}

impl ActivePage {
    fn mount(
        route: &Route,
        ctx: &PageContext,
        tasks: &mut PageTasks,
        flash: Option<String>,
    ) -> Self {
        match route {
            Route::Login => ActivePage::Login(LoginPage::mount(flash)),
            Route::Register => ActivePage::Register(RegisterPage::mount()),
            Route::Dashboard => ActivePage::Dashboard(DashboardPage::mount(ctx, tasks)),
            Route::Strategies => ActivePage::Strategies(StrategiesPage::mount(ctx, tasks, flash)),
            Route::NewStrategy => ActivePage::CreateStrategy(CreateStrategyPage::mount()),
            Route::Portfolio => ActivePage::Portfolio(PortfolioPage::mount(ctx, tasks)),
            Route::Notifications => ActivePage::Notifications(NotificationsPage::mount(ctx, tasks)),
            Route::Backtest => ActivePage::Backtest(BacktestPage::mount()),
            Route::MarketChart(symbol) => {
                ActivePage::MarketChart(MarketChartPage::mount(symbol, ctx, tasks))
            }
            Route::Health => ActivePage::Health(HealthPage::mount(ctx, tasks)),
            // The guard never renders these.
            Route::Root | Route::Unknown(_) => ActivePage::Loading,
        }
    }

    /// Text form of the page, when keys should be typed into it
    pub fn form(&self) -> Option<&FormState> {
        match self {
            ActivePage::Login(page) => Some(&page.form),
            ActivePage::Register(page) => Some(&page.form),
            ActivePage::CreateStrategy(page) => Some(&page.form),
            ActivePage::Backtest(page) => Some(&page.form),
            _ => None,
        }
    }

    fn form_mut(&mut self) -> Option<&mut FormState> {
        match self {
            ActivePage::Login(page) => Some(&mut page.form),
            ActivePage::Register(page) => Some(&mut page.form),
            ActivePage::CreateStrategy(page) => Some(&mut page.form),
            ActivePage::Backtest(page) => Some(&mut page.form),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    DeleteStrategy(u64),
    Logout,
}

/// Blocking yes/no prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub message: String,
    pub action: PendingAction,
}

pub struct DeskApp {
    pub route: Route,
    pub page: ActivePage,
    pub session: SessionSnapshot,
    pub modal: Option<Modal>,
    pub show_help: bool,
    running: bool,
    generation: Generation,
    /// Context tagged with the current generation
    ctx: PageContext,
    tasks: PageTasks,
    /// Route requested before the session was ready
    pending: Option<Route>,
}

impl DeskApp {
    pub fn new(ctx: PageContext) -> Self {
        let session = ctx.session.snapshot();
        Self {
            route: Route::Root,
            page: ActivePage::Loading,
            session,
            modal: None,
            show_help: false,
            running: true,
            generation: ctx.generation(),
            ctx,
            tasks: PageTasks::new(),
            pending: None,
        }
    }

    /// Check if app should continue running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Signal the app to quit
    pub fn quit(&mut self) {
        self.running = false;
        self.tasks.abort_all();
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Background tasks of the mounted page still running
    pub fn active_tasks(&self) -> usize {
        self.tasks.active()
    }

    /// Go to `requested` through the route guard
    pub fn navigate(&mut self, requested: Route, flash: Option<String>) {
        self.session = self.ctx.session.snapshot();
        self.modal = None;
        self.generation += 1;
        // Dropping the old guard aborts whatever the previous page started.
        self.tasks = PageTasks::new();
        self.ctx = self.ctx.for_generation(self.generation);

        match routing::settle(requested.clone(), &self.session) {
            GuardDecision::Loading => {
                debug!(route = %requested, "session not ready, holding navigation");
                self.page = ActivePage::Loading;
                self.route = requested.clone();
                self.pending = Some(requested);
            }
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => {
                let flash = if route == requested {
                    flash
                } else {
                    info!(from = %requested, to = %route, "route guard redirected");
                    None
                };
                self.page = ActivePage::mount(&route, &self.ctx, &mut self.tasks, flash);
                debug!(route = %route, generation = self.generation, "page mounted");
                self.route = route;
                self.pending = None;
            }
        }
    }

    fn perform(&mut self, action: PageAction) {
        if let PageAction::Navigate(route, flash) = action {
            self.navigate(route, flash);
        }
    }

    /// Apply a background result to the mounted page
    pub fn handle_page_message(&mut self, message: PageMessage) {
        if message.generation != self.generation {
            debug!(
                generation = message.generation,
                current = self.generation,
                "dropping result from an unmounted page"
            );
            return;
        }

        let action = match (&mut self.page, message.event) {
            (ActivePage::Dashboard(page), PageEvent::Dashboard(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::Strategies(page), PageEvent::Strategies(event)) => page.apply(event),
            (ActivePage::CreateStrategy(page), PageEvent::CreateStrategy(event)) => {
                page.apply(event)
            }
            (ActivePage::Portfolio(page), PageEvent::Portfolio(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::Notifications(page), PageEvent::Notifications(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::Backtest(page), PageEvent::Backtest(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::MarketChart(page), PageEvent::MarketChart(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::Health(page), PageEvent::Health(event)) => {
                page.apply(event);
                PageAction::None
            }
            (ActivePage::Login(page), PageEvent::Login(event)) => page.apply(event),
            (ActivePage::Register(page), PageEvent::Register(event)) => page.apply(event),
            (_, event) => {
                debug!(?event, "event does not belong to the mounted page");
                PageAction::None
            }
        };
        self.perform(action);
    }

    /// Navigation requested by the session owner (authorization loss)
    pub fn handle_nav(&mut self, command: NavCommand) {
        let NavCommand::Redirect(route) = command;
        self.session = self.ctx.session.snapshot();
        if route == self.route && !matches!(self.page, ActivePage::Loading) {
            // A rejected sign-in reports authorization loss from the login page itself.
            debug!(route = %route, "already on redirect target");
            return;
        }
        self.navigate(route, None);
    }

    pub fn handle_session(&mut self, snapshot: SessionSnapshot) {
        self.session = snapshot;
        if self.session.ready {
            if let Some(route) = self.pending.take() {
                self.navigate(route, None);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        // If a modal is open, only accept confirm/dismiss keys.
        if self.modal.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_modal(),
                KeyCode::Char('n') | KeyCode::Esc => self.dismiss_modal(),
                _ => {}
            }
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.page.form().is_some() {
            self.handle_form_key(key);
            return;
        }

        if let ActivePage::Strategies(page) = &mut self.page {
            if page.popup.is_some() && matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                page.dismiss();
                return;
            }
        }

        match KeyAction::from(key) {
            KeyAction::Quit => self.quit(),
            KeyAction::Help => self.show_help = true,
            KeyAction::Logout if self.session.authenticated => {
                self.show_modal(LOGOUT_CONFIRM.to_string(), PendingAction::Logout);
            }
            KeyAction::Jump(n) => {
                if let Some(route) = self.tab_route(n) {
                    self.navigate(route, None);
                }
            }
            KeyAction::None | KeyAction::Logout => {}
            action => {
                let next = self.page_action(action);
                self.perform(next);
            }
        }
    }

    /// Keys typed while a form page is mounted
    fn handle_form_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Enter => {
                self.submit_form();
                PageAction::None
            }
            KeyCode::Esc => self.leave_form(),
            KeyCode::F(2) => match &self.page {
                ActivePage::Login(page) => page.go_register(),
                ActivePage::Register(page) => page.go_login(),
                _ => PageAction::None,
            },
            code => {
                if let Some(form) = self.page.form_mut() {
                    match code {
                        KeyCode::Tab | KeyCode::Down => form.focus_next(),
                        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c)
                            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
                        {
                            form.insert(c)
                        }
                        _ => {}
                    }
                }
                PageAction::None
            }
        };
        self.perform(action);
    }

    fn submit_form(&mut self) {
        let ctx = &self.ctx;
        let tasks = &mut self.tasks;
        match &mut self.page {
            ActivePage::Login(page) => page.submit(ctx, tasks),
            ActivePage::Register(page) => page.submit(ctx, tasks),
            ActivePage::CreateStrategy(page) => page.submit(ctx, tasks),
            ActivePage::Backtest(page) => page.submit(ctx, tasks),
            _ => {}
        }
    }

    fn leave_form(&mut self) -> PageAction {
        if matches!(self.page, ActivePage::Login(_)) {
            self.quit();
            return PageAction::None;
        }
        match &self.page {
            ActivePage::Register(page) => page.go_login(),
            ActivePage::CreateStrategy(page) => page.cancel(),
            ActivePage::Backtest(_) => PageAction::Navigate(Route::Dashboard, None),
            _ => PageAction::None,
        }
    }

    /// Page-specific keys on list and chart pages
    fn page_action(&mut self, action: KeyAction) -> PageAction {
        let remount = PageAction::Navigate(self.route.clone(), None);
        let ctx = &self.ctx;
        let tasks = &mut self.tasks;

        match &mut self.page {
            ActivePage::Dashboard(page) => match action {
                KeyAction::Reload => remount,
                KeyAction::Select => PageAction::Navigate(Route::MarketChart(page.symbol.clone()), None),
                _ => PageAction::None,
            },
            ActivePage::Strategies(page) => {
                match action {
                    KeyAction::Up => page.select_prev(),
                    KeyAction::Down => page.select_next(),
                    KeyAction::Select => page.toggle_selected(ctx, tasks),
                    KeyAction::Delete => {
                        if let Some(strategy) = page.selected_strategy() {
                            self.modal = Some(Modal {
                                message: DELETE_CONFIRM.to_string(),
                                action: PendingAction::DeleteStrategy(strategy.id),
                            });
                        }
                    }
                    KeyAction::New => return page.new_strategy(),
                    KeyAction::Reload => page.reload(ctx, tasks),
                    _ => {}
                }
                PageAction::None
            }
            ActivePage::Portfolio(page) => match action {
                KeyAction::Up => {
                    page.scroll_up();
                    PageAction::None
                }
                KeyAction::Down => {
                    page.scroll_down();
                    PageAction::None
                }
                KeyAction::Reload => remount,
                _ => PageAction::None,
            },
            ActivePage::Notifications(page) => match action {
                KeyAction::Up => {
                    page.scroll_up();
                    PageAction::None
                }
                KeyAction::Down => {
                    page.scroll_down();
                    PageAction::None
                }
                KeyAction::Reload => remount,
                _ => PageAction::None,
            },
            ActivePage::MarketChart(page) => {
                match action {
                    KeyAction::NextTimeframe => page.next_timeframe(ctx, tasks),
                    KeyAction::PrevTimeframe => {
                        let previous = page.timeframe.prev();
                        page.set_timeframe(previous, ctx, tasks);
                    }
                    KeyAction::ToggleSma => page.toggle_sma(),
                    KeyAction::ToggleVolume => page.toggle_volume(),
                    KeyAction::Reload => return remount,
                    _ => {}
                }
                PageAction::None
            }
            ActivePage::Health(page) => {
                if action == KeyAction::Reload {
                    page.reload(ctx, tasks);
                }
                PageAction::None
            }
            _ => PageAction::None,
        }
    }

    /// Route behind navigation key `n`
    pub fn tab_route(&self, n: u8) -> Option<Route> {
        let route = match n {
            1 => Route::Dashboard,
            2 => Route::Strategies,
            3 => Route::Portfolio,
            4 => Route::Notifications,
            5 => Route::Backtest,
            6 => Route::MarketChart(self.ctx.config.market.chart_symbol.to_uppercase()),
            7 => Route::Health,
            _ => return None,
        };
        Some(route)
    }

    /// Index into [`NAV_TABS`] of the current route
    pub fn active_tab(&self) -> Option<usize> {
        match self.route {
            Route::Dashboard => Some(0),
            Route::Strategies | Route::NewStrategy => Some(1),
            Route::Portfolio => Some(2),
            Route::Notifications => Some(3),
            Route::Backtest => Some(4),
            Route::MarketChart(_) => Some(5),
            Route::Health => Some(6),
            _ => None,
        }
    }

    /// Show a confirmation modal
    pub fn show_modal(&mut self, message: String, action: PendingAction) {
        self.modal = Some(Modal { message, action });
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    fn confirm_modal(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        match modal.action {
            PendingAction::DeleteStrategy(id) => {
                if let ActivePage::Strategies(page) = &mut self.page {
                    page.delete(id, &self.ctx, &mut self.tasks);
                }
            }
            PendingAction::Logout => self.logout(),
        }
    }

    pub fn logout(&mut self) {
        self.ctx.session.logout();
        info!("signed out");
        self.navigate(Route::Login, None);
    }
}
