//! Typed wrappers for each backend endpoint.

use tracing::info;

use super::api_client::ApiClient;
use super::transport::ApiRequest;
use crate::domain::{
    MarketSeries, NewStrategy, Notification, PingResponse, PortfolioPosition, Quote,
    RegisterRequest, RegisterResponse, Strategy, Timeframe, TokenResponse, User, UserSummary,
};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct BackendApi {
    client: ApiClient,
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}

impl BackendApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `POST /auth/token` (OAuth2 password form)
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let request = ApiRequest::post_form(
            "/auth/token",
            &[("username", username.trim()), ("password", password)],
        );
        let token: TokenResponse = self.client.fetch(request).await?;
        info!(username = %username.trim(), "credentials accepted");
        Ok(token)
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.client
            .fetch(ApiRequest::post_json("/auth/register", request.to_json()))
            .await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.client.fetch(ApiRequest::get("/users/me")).await
    }

    pub async fn user_summary(&self) -> Result<UserSummary> {
        self.client
            .fetch(ApiRequest::get("/analytics/user-summary"))
            .await
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.client
            .fetch(ApiRequest::get(format!(
                "/market-data/quote/{}",
                segment(symbol)
            )))
            .await
    }

    pub async fn market_series(&self, symbol: &str, timeframe: Timeframe) -> Result<MarketSeries> {
        let request = ApiRequest::get(format!("/market-data/{}", segment(symbol)))
            .with_query("timeframe", timeframe.as_str());
        self.client.fetch(request).await
    }

    pub async fn strategies(&self) -> Result<Vec<Strategy>> {
        self.client.fetch(ApiRequest::get("/strategies")).await
    }

    pub async fn create_strategy(&self, strategy: &NewStrategy) -> Result<()> {
        let body = serde_json::to_value(strategy)?;
        self.client
            .send_unit(ApiRequest::post_json("/strategies/", body))
            .await
    }

    /// `PUT /strategies/{id}` with the full record
    pub async fn update_strategy(&self, strategy: &Strategy) -> Result<()> {
        let body = serde_json::to_value(strategy)?;
        self.client
            .send_unit(ApiRequest::put_json(format!("/strategies/{}", strategy.id), body))
            .await
    }

    pub async fn delete_strategy(&self, id: u64) -> Result<()> {
        self.client
            .send_unit(ApiRequest::delete(format!("/strategies/{id}")))
            .await
    }

    pub async fn portfolio(&self, user_id: u64) -> Result<Vec<PortfolioPosition>> {
        self.client
            .fetch(ApiRequest::get(format!("/portfolio/{user_id}")))
            .await
    }

    pub async fn notifications(&self, user_id: u64) -> Result<Vec<Notification>> {
        self.client
            .fetch(ApiRequest::get(format!("/notifications/{user_id}")))
            .await
    }

    pub async fn ping(&self) -> Result<PingResponse> {
        self.client.fetch(ApiRequest::get("/ping")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::transport::{ApiResponse, MockTransport, RequestBody};
    use crate::session::MemoryTokenStore;
    use mockall::predicate::function;
    use reqwest::Method;
    use std::sync::Arc;

    fn backend(mock: MockTransport) -> BackendApi {
        BackendApi::new(ApiClient::new(
            Arc::new(mock),
            Arc::new(MemoryTokenStore::with_token("tok")),
        ))
    }

    #[tokio::test]
    async fn test_login_posts_form() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(function(|req: &ApiRequest| {
                req.method == Method::POST
                    && req.path == "/auth/token"
                    && req.body
                        == RequestBody::Form(vec![
                            ("username".into(), "ana".into()),
                            ("password".into(), "pw".into()),
                        ])
            }))
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::ok(
                    r#"{"access_token":"jwt","token_type":"bearer"}"#,
                ))
            });

        let token = backend(mock).login(" ana ", "pw").await.unwrap();
        assert_eq!(token.access_token, "jwt");
    }

    #[tokio::test]
    async fn test_toggle_sends_full_record() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(function(|req: &ApiRequest| {
                req.method == Method::PUT
                    && req.path == "/strategies/4"
                    && matches!(&req.body, RequestBody::Json(v)
                        if v["is_active"] == true && v["name"] == "Breakout")
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok("{}")));

        let strategy = Strategy {
            id: 4,
            name: "Breakout".into(),
            description: None,
            is_active: false,
            extra: Default::default(),
        };
        backend(mock)
            .update_strategy(&strategy.toggled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_toggle_keeps_unmodelled_fields() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(function(|req: &ApiRequest| {
                matches!(&req.body, RequestBody::Json(v)
                    if v["is_active"] == true
                        && v["username"] == "ana"
                        && v["risk_level"] == "high"
                        && v["description"] == "d")
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok("{}")));

        let strategy: Strategy = serde_json::from_str(
            r#"{"id":4,"name":"Breakout","description":"d","is_active":false,"username":"ana","risk_level":"high"}"#,
        )
        .unwrap();
        assert_eq!(strategy.extra.len(), 2);
        backend(mock)
            .update_strategy(&strategy.toggled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_market_series_sends_timeframe() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(function(|req: &ApiRequest| {
                req.path == "/market-data/IBM"
                    && req.query == vec![("timeframe".to_string(), "1W".to_string())]
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(r#"{"values":[]}"#)));

        let series = backend(mock)
            .market_series("IBM", Timeframe::OneWeek)
            .await
            .unwrap();
        assert!(series.values.is_empty());
    }

    #[tokio::test]
    async fn test_symbol_is_path_encoded() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(function(|req: &ApiRequest| req.path == "/market-data/quote/BRK%2FB"))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(r#"{"symbol":"BRK/B","price":1.0}"#)));

        let quote = backend(mock).quote("BRK/B").await.unwrap();
        assert_eq!(quote.symbol, "BRK/B");
    }
}
