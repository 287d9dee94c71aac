//! Path → page mapping gated on the session.

use crate::session::SessionSnapshot;

/// Every addressable location in the app
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Strategies,
    NewStrategy,
    Portfolio,
    Notifications,
    Backtest,
    MarketChart(String),
    Health,
    Root,
    Unknown(String),
}

/// Outcome of consulting the guard for a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not hydrated yet; show a placeholder and decide later
    Loading,
    Render(Route),
    Redirect(Route),
}

/// Navigation requested from outside the page that is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    Redirect(Route),
}

/// Bound on redirect chains followed by [`settle`]
const MAX_REDIRECTS: usize = 4;

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };

        match trimmed {
            "" | "/" => Route::Root,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/strategies" => Route::Strategies,
            "/strategies/new" => Route::NewStrategy,
            "/portfolio" => Route::Portfolio,
            "/notifications" => Route::Notifications,
            "/backtest" => Route::Backtest,
            "/health" => Route::Health,
            other => match other.strip_prefix("/market/") {
                Some(symbol) if !symbol.is_empty() && !symbol.contains('/') => {
                    Route::MarketChart(symbol.to_uppercase())
                }
                _ => Route::Unknown(other.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Strategies => "/strategies".into(),
            Route::NewStrategy => "/strategies/new".into(),
            Route::Portfolio => "/portfolio".into(),
            Route::Notifications => "/notifications".into(),
            Route::Backtest => "/backtest".into(),
            Route::MarketChart(symbol) => format!("/market/{symbol}"),
            Route::Health => "/health".into(),
            Route::Root => "/".into(),
            Route::Unknown(path) => path.clone(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Route::Login => "Sign in".into(),
            Route::Register => "Create account".into(),
            Route::Dashboard => "Dashboard".into(),
            Route::Strategies => "Strategies".into(),
            Route::NewStrategy => "New strategy".into(),
            Route::Portfolio => "Portfolio".into(),
            Route::Notifications => "Notifications".into(),
            Route::Backtest => "Backtest".into(),
            Route::MarketChart(symbol) => format!("Market · {symbol}"),
            Route::Health => "Backend health".into(),
            Route::Root => "/".into(),
            Route::Unknown(path) => path.clone(),
        }
    }

    /// Pages that require an authenticated session
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::Strategies
                | Route::NewStrategy
                | Route::Portfolio
                | Route::Notifications
                | Route::Backtest
                | Route::MarketChart(_)
        )
    }

    /// Pages only meant for signed-out users
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// One guard step for `route` under `session`
pub fn resolve(route: &Route, session: &SessionSnapshot) -> GuardDecision {
    if !session.ready {
        return GuardDecision::Loading;
    }

    match route {
        Route::Unknown(_) => GuardDecision::Redirect(Route::Dashboard),
        Route::Root if session.authenticated => GuardDecision::Redirect(Route::Dashboard),
        Route::Root => GuardDecision::Redirect(Route::Login),
        r if r.is_guest_only() && session.authenticated => {
            GuardDecision::Redirect(Route::Dashboard)
        }
        r if r.is_private() && !session.authenticated => GuardDecision::Redirect(Route::Login),
        r => GuardDecision::Render(r.clone()),
    }
}

/// Follow redirects until a renderable route (or `Loading`) is reached
pub fn settle(route: Route, session: &SessionSnapshot) -> GuardDecision {
    let mut current = route;
    for _ in 0..MAX_REDIRECTS {
        match resolve(&current, session) {
            GuardDecision::Redirect(next) => current = next,
            decision => return decision,
        }
    }
    // Every chain ends at Dashboard or Login within two hops.
    GuardDecision::Render(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(authenticated: bool) -> SessionSnapshot {
        SessionSnapshot {
            authenticated,
            user: None,
            ready: true,
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for path in [
            "/login",
            "/register",
            "/dashboard",
            "/strategies",
            "/strategies/new",
            "/portfolio",
            "/notifications",
            "/backtest",
            "/health",
            "/market/IBM",
        ] {
            assert_eq!(Route::parse(path).path(), path);
        }
        assert_eq!(Route::parse("/portfolio/"), Route::Portfolio);
        assert_eq!(Route::parse("/market/aapl"), Route::MarketChart("AAPL".into()));
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse("/xyz"), Route::Unknown("/xyz".into()));
        assert_eq!(Route::parse("/market/"), Route::Unknown("/market".into()));
    }

    #[test]
    fn test_loading_until_ready() {
        let pending = SessionSnapshot::default();
        assert_eq!(resolve(&Route::Portfolio, &pending), GuardDecision::Loading);
        assert_eq!(resolve(&Route::Unknown("/x".into()), &pending), GuardDecision::Loading);
        assert_eq!(settle(Route::Root, &pending), GuardDecision::Loading);
    }

    #[test]
    fn test_private_pages_require_login() {
        assert_eq!(
            resolve(&Route::Portfolio, &session(false)),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            resolve(&Route::MarketChart("IBM".into()), &session(false)),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            resolve(&Route::Portfolio, &session(true)),
            GuardDecision::Render(Route::Portfolio)
        );
    }

    #[test]
    fn test_guest_pages_redirect_when_signed_in() {
        assert_eq!(
            resolve(&Route::Login, &session(true)),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            resolve(&Route::Register, &session(true)),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            resolve(&Route::Login, &session(false)),
            GuardDecision::Render(Route::Login)
        );
    }

    #[test]
    fn test_unknown_and_root() {
        let unknown = Route::Unknown("/xyz".into());
        assert_eq!(
            resolve(&unknown, &session(false)),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            resolve(&unknown, &session(true)),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(settle(unknown.clone(), &session(false)), GuardDecision::Render(Route::Login));
        assert_eq!(settle(unknown, &session(true)), GuardDecision::Render(Route::Dashboard));
        assert_eq!(settle(Route::Root, &session(false)), GuardDecision::Render(Route::Login));
    }

    #[test]
    fn test_health_is_public() {
        assert_eq!(
            resolve(&Route::Health, &session(false)),
            GuardDecision::Render(Route::Health)
        );
        assert_eq!(
            resolve(&Route::Health, &session(true)),
            GuardDecision::Render(Route::Health)
        );
    }
}
