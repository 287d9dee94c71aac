//! Wire-level request/response types and the `Transport` seam.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{DeskError, Result};

#[derive(Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Transport-agnostic description of one backend call
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base address, always starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, RequestBody::Empty)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, RequestBody::Empty)
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path, RequestBody::Json(body))
    }

    pub fn put_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path, RequestBody::Json(body))
    }

    pub fn post_form(path: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(Method::POST, path, RequestBody::Form(fields))
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.without_header(AUTHORIZATION.as_str())
            .with_header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Credential carried by the request, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.header(AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

// Headers and bodies may carry credentials; keep them out of logs.
impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        let body = match &self.body {
            RequestBody::Empty => "empty",
            RequestBody::Json(_) => "json",
            RequestBody::Form(_) => "form",
        };
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("body", &body)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error text from a `{"detail": ...}` body, falling back to the raw body
    pub fn detail(&self) -> String {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Object(map)) => match map.get("detail") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => self.body.clone(),
            },
            _ if self.body.trim().is_empty() => format!("status {}", self.status),
            _ => self.body.clone(),
        }
    }
}

/// Sends one request and returns the raw response; no status handling
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Production transport over `reqwest`
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut builder = Client::builder().user_agent(concat!("tradedesk/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| DeskError::Internal(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| DeskError::Internal(format!("invalid header value: {}", e)))?;
            req = req.header(name, value);
        }

        req = match request.body {
            RequestBody::Empty => req,
            RequestBody::Json(body) => req.json(&body),
            RequestBody::Form(fields) => req.form(&fields),
        };

        let resp = req.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DeskError::Network(format!("{} {}: {}", request.method, request.path, e))
            } else {
                DeskError::Http(e)
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        debug!(method = %request.method, path = %request.path, status, "backend responded");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_replaces_existing_authorization() {
        let request = ApiRequest::get("/users/me")
            .with_header("authorization", "Basic abc")
            .bearer("tok");
        assert_eq!(request.bearer_token(), Some("tok"));
        assert_eq!(
            request
                .headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
                .count(),
            1
        );
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let request = ApiRequest::post_form("/auth/token", &[("username", "ana"), ("password", "pw")])
            .bearer("secret-token");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("pw\""));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_detail_extraction() {
        assert_eq!(
            ApiResponse::new(400, r#"{"detail":"Username already registered"}"#).detail(),
            "Username already registered"
        );
        assert_eq!(ApiResponse::new(500, "Internal Server Error").detail(), "Internal Server Error");
        assert_eq!(ApiResponse::new(502, "").detail(), "status 502");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:8000/", None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000");
    }
}
