//! In-process stand-in for the backend.
//!
//! Backs `tradedesk dashboard --demo` and doubles as a scripted fake in
//! tests: any endpoint can be overridden with a fixed response or a
//! transport failure, and every request is recorded.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use reqwest::Method;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::transport::{ApiRequest, ApiResponse, RequestBody, Transport};
use crate::domain::{Strategy, Timeframe};
use crate::error::{DeskError, Result};

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_TOKEN: &str = "demo-session-token";

#[derive(Debug, Clone)]
enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

struct DemoState {
    strategies: Vec<Strategy>,
    next_id: u64,
    quote_ticks: u64,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            strategies: vec![
                Strategy {
                    id: 1,
                    name: "SMA crossover".into(),
                    description: Some("Buy when SMA(20) crosses above SMA(50)".into()),
                    is_active: true,
                    extra: Default::default(),
                },
                Strategy {
                    id: 2,
                    name: "RSI mean reversion".into(),
                    description: Some("Buy below RSI 30, sell above RSI 70".into()),
                    is_active: false,
                    extra: Default::default(),
                },
            ],
            next_id: 3,
            quote_ticks: 0,
        }
    }
}

pub struct DemoTransport {
    state: Mutex<DemoState>,
    scripted: Mutex<HashMap<(Method, String), Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
    arrivals: Mutex<Vec<(String, Instant)>>,
    stalls: Mutex<HashMap<String, Duration>>,
    latency: Duration,
}

impl Default for DemoTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DemoState::default()),
            scripted: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            arrivals: Mutex::new(Vec::new()),
            stalls: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_strategies(self, strategies: Vec<Strategy>) -> Self {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.next_id = strategies.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            state.strategies = strategies;
        }
        self
    }

    /// Answer `method path` with a fixed status and body
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (method, path.to_string()),
                Scripted::Respond(ApiResponse::new(status, body)),
            );
    }

    /// Make `method path` fail as if the backend were unreachable
    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.to_string()), Scripted::Fail(reason.to_string()));
    }

    /// Hold the next request to `path` for `delay` before answering
    pub fn stall_next(&self, path: &str, delay: Duration) {
        self.stalls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), delay);
    }

    pub fn clear_scripts(&self) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// When each request to `path` arrived, in order
    pub fn request_times(&self, path: &str) -> Vec<Instant> {
        self.arrivals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn route(&self, request: &ApiRequest) -> ApiResponse {
        let public = matches!(
            request.path.as_str(),
            "/auth/token" | "/auth/register" | "/ping"
        );
        if !public && request.bearer_token() != Some(DEMO_TOKEN) {
            return ApiResponse::new(401, r#"{"detail":"Not authenticated"}"#);
        }

        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        match (&request.method, segments.as_slice()) {
            (&Method::POST, ["auth", "token"]) => login(&request.body),
            (&Method::POST, ["auth", "register"]) => {
                json_ok(json!({"message": "User registered successfully!", "user_id": 2}))
            }
            (&Method::GET, ["ping"]) => json_ok(json!({"message": "pong"})),
            (&Method::GET, ["users", "me"]) => json_ok(json!({
                "id": 1,
                "username": DEMO_USERNAME,
                "email": "demo@tradedesk.local",
            })),
            (&Method::GET, ["analytics", "user-summary"]) => json_ok(json!({
                "user_id": 1,
                "username": DEMO_USERNAME,
                "email": "demo@tradedesk.local",
                "portfolios": 2,
                "orders_executed": 37,
                "total_volume": "48210.55",
                "most_traded_asset": "PETR4",
                "strategies_linked": ["SMA crossover", "RSI mean reversion"],
            })),
            (&Method::GET, ["market-data", "quote", symbol]) => {
                state.quote_ticks += 1;
                let price = dec!(182.35) + Decimal::new((state.quote_ticks % 7) as i64 * 5, 2);
                json_ok(json!({
                    "symbol": symbol.to_uppercase(),
                    "price": price.to_string(),
                    "volume": 3_412_900,
                }))
            }
            (&Method::GET, ["market-data", _symbol]) => {
                let timeframe = request
                    .query
                    .iter()
                    .find(|(k, _)| k == "timeframe")
                    .and_then(|(_, v)| v.parse::<Timeframe>().ok())
                    .unwrap_or_default();
                json_ok(json!({ "values": series(timeframe) }))
            }
            (&Method::GET, ["strategies"]) => json_ok(json!(state.strategies)),
            (&Method::POST, ["strategies"]) => {
                let RequestBody::Json(body) = &request.body else {
                    return ApiResponse::new(422, r#"{"detail":"expected JSON body"}"#);
                };
                let name = body["name"].as_str().unwrap_or_default().trim().to_string();
                if name.is_empty() {
                    return ApiResponse::new(422, r#"{"detail":"name is required"}"#);
                }
                let strategy = Strategy {
                    id: state.next_id,
                    name,
                    description: body["description"].as_str().map(str::to_string),
                    is_active: body["is_active"].as_bool().unwrap_or(false),
                    extra: Default::default(),
                };
                state.next_id += 1;
                state.strategies.push(strategy.clone());
                json_ok(json!(strategy))
            }
            (&Method::PUT, ["strategies", id]) => {
                let RequestBody::Json(body) = &request.body else {
                    return ApiResponse::new(422, r#"{"detail":"expected JSON body"}"#);
                };
                let Some(existing) = id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| state.strategies.iter_mut().find(|s| s.id == id))
                else {
                    return not_found("Strategy not found");
                };
                if let Some(name) = body["name"].as_str() {
                    existing.name = name.to_string();
                }
                existing.description = body["description"].as_str().map(str::to_string);
                existing.is_active = body["is_active"].as_bool().unwrap_or(existing.is_active);
                json_ok(json!(existing))
            }
            (&Method::DELETE, ["strategies", id]) => {
                let before = state.strategies.len();
                if let Ok(id) = id.parse::<u64>() {
                    state.strategies.retain(|s| s.id != id);
                }
                if state.strategies.len() == before {
                    not_found("Strategy not found")
                } else {
                    json_ok(json!({"message": "Strategy deleted"}))
                }
            }
            (&Method::GET, ["portfolio", _user]) => json_ok(json!([
                {"asset": "PETR4", "quantity": 300, "average_price": "31.42", "pnl": "412.80"},
                {"asset": "VALE3", "quantity": 120, "average_price": "68.10", "pnl": "-96.00"},
                {"asset": "ITUB4", "quantity": 200, "average_price": "27.05", "pnl": "0"},
            ])),
            (&Method::GET, ["notifications", _user]) => json_ok(json!([
                {"id": 1, "type": "success", "message": "Order executed: buy 100 PETR4 @ 31.40",
                 "source": "executor", "timestamp": "2024-05-02T10:14:00"},
                {"id": 2, "type": "alert", "message": "VALE3 dropped 3% in the last hour",
                 "source": "market", "timestamp": "2024-05-02T11:02:00"},
                {"id": 3, "type": "info", "message": "Strategy 'SMA crossover' evaluated 12 signals",
                 "source": "strategy-runner", "timestamp": "2024-05-02T12:00:00"},
                {"id": 4, "type": "error", "message": "Order rejected: insufficient balance",
                 "source": "executor", "timestamp": "2024-05-02T12:31:00"},
            ])),
            _ => not_found("Not Found"),
        }
    }
}

#[async_trait]
impl Transport for DemoTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.arrivals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request.path.clone(), Instant::now()));

        let stall = self
            .stalls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request.path);
        let delay = self.latency + stall.unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let scripted = self
            .scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(request.method.clone(), request.path.clone()))
            .cloned();

        let response = match scripted {
            Some(Scripted::Respond(response)) => response,
            Some(Scripted::Fail(reason)) => return Err(DeskError::Network(reason)),
            None => self.route(&request),
        };
        debug!(method = %request.method, path = %request.path, status = response.status, "demo backend");
        Ok(response)
    }
}

fn json_ok(value: Value) -> ApiResponse {
    ApiResponse::ok(value.to_string())
}

fn not_found(detail: &str) -> ApiResponse {
    ApiResponse::new(404, json!({ "detail": detail }).to_string())
}

fn login(body: &RequestBody) -> ApiResponse {
    let RequestBody::Form(fields) = body else {
        return ApiResponse::new(422, r#"{"detail":"expected form body"}"#);
    };
    let field = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    };
    if field("username").is_empty() || field("password") != DEMO_PASSWORD {
        return ApiResponse::new(401, r#"{"detail":"Invalid credentials"}"#);
    }
    json_ok(json!({"access_token": DEMO_TOKEN, "token_type": "bearer"}))
}

fn series(timeframe: Timeframe) -> Vec<Value> {
    let (points, step) = match timeframe {
        Timeframe::OneDay => (39, ChronoDuration::minutes(10)),
        Timeframe::OneWeek => (35, ChronoDuration::hours(4)),
        Timeframe::OneMonth => (30, ChronoDuration::days(1)),
        Timeframe::ThreeMonths => (60, ChronoDuration::days(1)),
        Timeframe::OneYear => (52, ChronoDuration::weeks(1)),
    };
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 5, 2)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap_or_default();

    (0..points)
        .map(|i: i64| {
            // Deterministic wobble around a slow upward drift.
            let wobble = Decimal::new(((i * 7) % 11 - 5) * 25, 2);
            let close = dec!(178.00) + Decimal::new(i * 15, 2) + wobble;
            json!({
                "datetime": (start + step * i as i32).format("%Y-%m-%dT%H:%M:%S").to_string(),
                "open": (close - dec!(0.40)).to_string(),
                "high": (close + dec!(0.90)).to_string(),
                "low": (close - dec!(1.10)).to_string(),
                "close": close.to_string(),
                "volume": 150_000 + (i % 5) * 20_000,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketSeries;

    #[tokio::test]
    async fn test_private_routes_need_demo_token() {
        let demo = DemoTransport::new();
        let anonymous = demo.send(ApiRequest::get("/strategies")).await.unwrap();
        assert_eq!(anonymous.status, 401);

        let authed = demo
            .send(ApiRequest::get("/strategies").bearer(DEMO_TOKEN))
            .await
            .unwrap();
        assert_eq!(authed.status, 200);
        assert_eq!(demo.request_count("/strategies"), 2);
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let demo = DemoTransport::new();
        let bad = demo
            .send(ApiRequest::post_form(
                "/auth/token",
                &[("username", "demo"), ("password", "nope")],
            ))
            .await
            .unwrap();
        assert_eq!(bad.status, 401);

        let good = demo
            .send(ApiRequest::post_form(
                "/auth/token",
                &[("username", "demo"), ("password", DEMO_PASSWORD)],
            ))
            .await
            .unwrap();
        assert!(good.body.contains(DEMO_TOKEN));
    }

    #[tokio::test]
    async fn test_scripted_failure_wins() {
        let demo = DemoTransport::new();
        demo.fail(Method::GET, "/portfolio/1", "connection refused");
        let err = demo
            .send(ApiRequest::get("/portfolio/1").bearer(DEMO_TOKEN))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Network(_)));
    }

    #[test]
    fn test_series_sizes_and_shape() {
        let values = series(Timeframe::OneYear);
        assert_eq!(values.len(), 52);
        let parsed: MarketSeries =
            serde_json::from_value(json!({ "values": series(Timeframe::OneDay) })).unwrap();
        assert_eq!(parsed.values.len(), 39);
        assert!(parsed.values.iter().all(|bar| bar.close > Decimal::ZERO));
    }
}
