//! The single request pipeline every backend call goes through.
//!
//! Outbound, the stored credential is attached as a bearer header.
//! Inbound, a 401 clears the credential and broadcasts
//! [`AuthEvent::AuthorizationLost`]; whoever owns the session decides
//! where to go next.

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::ApiConfig;
use crate::domain::Validate;
use crate::error::{DeskError, Result};
use crate::session::SharedTokenStore;

const AUTH_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The backend rejected the credential on `path`
    AuthorizationLost { path: String },
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: SharedTokenStore,
    events: broadcast::Sender<AuthEvent>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, store: SharedTokenStore) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            transport,
            store,
            events,
        }
    }

    pub fn from_config(config: &ApiConfig, store: SharedTokenStore) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeout())?;
        Ok(Self::new(Arc::new(transport), store))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    /// Send a request and apply the credential and 401 policies
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut request = request.without_header(AUTHORIZATION.as_str());
        if let Some(token) = self.store.get() {
            request = request.bearer(&token);
        }

        let method = request.method.clone();
        let path = request.path.clone();
        debug!(method = %method, path = %path, "api request");

        let response = self.transport.send(request).await?;

        if response.status == 401 {
            warn!(method = %method, path = %path, "backend answered 401, clearing credential");
            self.store.clear();
            if self
                .events
                .send(AuthEvent::AuthorizationLost { path: path.clone() })
                .is_err()
            {
                debug!("no session listener for authorization events");
            }
            return Err(DeskError::Unauthorized);
        }

        if !response.is_success() {
            return Err(DeskError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }

        Ok(response)
    }

    /// Execute and decode a typed, validated payload
    pub async fn fetch<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let endpoint = format!("{} {}", request.method, request.path);
        let response = self.execute(request).await?;

        let value: T =
            serde_json::from_str(&response.body).map_err(|e| DeskError::MalformedPayload {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        value
            .validate()
            .map_err(|reason| DeskError::MalformedPayload { endpoint, reason })?;
        Ok(value)
    }

    /// Execute, ignoring any response body
    pub async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("has_token", &self.store.get().is_some())
            .finish()
    }
}
