use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw backtest form input, all fields as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacktestForm {
    pub asset: String,
    pub condition: String,
    pub rule: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestFormError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Dates must use the YYYY-MM-DD format.")]
    InvalidDate,

    #[error("The start date must be before the end date.")]
    StartAfterEnd,
}

/// Validated backtest parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacktestRequest {
    pub asset: String,
    pub condition: String,
    pub rule: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BacktestForm {
    pub fn validate(&self) -> Result<BacktestRequest, BacktestFormError> {
        let fields = [
            &self.asset,
            &self.condition,
            &self.rule,
            &self.start,
            &self.end,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(BacktestFormError::MissingFields);
        }

        let start = NaiveDate::parse_from_str(self.start.trim(), DATE_FORMAT)
            .map_err(|_| BacktestFormError::InvalidDate)?;
        let end = NaiveDate::parse_from_str(self.end.trim(), DATE_FORMAT)
            .map_err(|_| BacktestFormError::InvalidDate)?;

        // Same-day ranges are allowed.
        if start > end {
            return Err(BacktestFormError::StartAfterEnd);
        }

        Ok(BacktestRequest {
            asset: self.asset.trim().to_uppercase(),
            condition: self.condition.trim().to_string(),
            rule: self.rule.trim().to_string(),
            start,
            end,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub pnl: Decimal,
    pub orders: u32,
    pub success: bool,
}

/// Locally simulated backtest run; no backend endpoint exists for it
pub async fn simulate(request: &BacktestRequest, delay: Duration) -> BacktestResult {
    debug!(
        asset = %request.asset,
        start = %request.start,
        end = %request.end,
        "simulating backtest"
    );
    tokio::time::sleep(delay).await;
    BacktestResult {
        pnl: dec!(1250.75),
        orders: 14,
        success: true,
    }
}
