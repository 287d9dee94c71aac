use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{require_text, Validate};

/// Authenticated user as returned by `GET /users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl Validate for User {
    fn validate(&self) -> Result<(), String> {
        require_text("username", &self.username)
    }
}

/// Account overview from `GET /analytics/user-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub user_id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub portfolios: u64,
    #[serde(default)]
    pub orders_executed: u64,
    #[serde(default)]
    pub total_volume: Decimal,
    #[serde(default)]
    pub most_traded_asset: Option<String>,
    #[serde(default)]
    pub strategies_linked: Vec<String>,
}

impl Validate for UserSummary {
    fn validate(&self) -> Result<(), String> {
        if self.total_volume.is_sign_negative() {
            return Err("total_volume must not be negative".to_string());
        }
        Ok(())
    }
}

/// Bearer token issued by `POST /auth/token`
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// Never leak the credential into logs.
impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl Validate for TokenResponse {
    fn validate(&self) -> Result<(), String> {
        require_text("access_token", &self.access_token)?;
        if !self.token_type.eq_ignore_ascii_case("bearer") {
            return Err(format!("unsupported token_type {}", self.token_type));
        }
        Ok(())
    }
}

/// Body of `POST /auth/register`
#[derive(Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegisterRequest {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username.trim(),
            "email": self.email.trim(),
            "password": self.password.as_str(),
        })
    }

    /// Client-side checks run before the request is sent
    pub fn check(&self) -> Result<(), String> {
        if self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err("Please fill in all fields.".to_string());
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err("Please enter a valid email address.".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl Validate for RegisterResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Liveness probe answer from `GET /ping`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

impl Validate for PingResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_user_summary_tolerates_missing_optional_fields() {
        let summary: UserSummary =
            serde_json::from_str(r#"{"username":"ana","total_volume":1520.5}"#).unwrap();
        assert_eq!(summary.username, "ana");
        assert_eq!(summary.total_volume, dec!(1520.5));
        assert!(summary.most_traded_asset.is_none());
        assert!(summary.validate().is_ok());
    }

    #[test]
    fn test_token_response_debug_is_redacted() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"secret-jwt","token_type":"bearer"}"#)
                .unwrap();
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret-jwt"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_token_response_rejects_empty_token() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(token.validate().is_err());
    }

    #[test]
    fn test_register_request_checks() {
        let mut req = RegisterRequest {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: Zeroizing::new("hunter2".into()),
        };
        assert!(req.check().is_ok());

        req.email = "not-an-email".into();
        assert_eq!(req.check().unwrap_err(), "Please enter a valid email address.");

        req.password = Zeroizing::new(String::new());
        assert_eq!(req.check().unwrap_err(), "Please fill in all fields.");
    }
}
