use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_text, Validate};

/// One holding from `GET /portfolio/{user_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub asset: String,
    pub quantity: Decimal,
    #[serde(alias = "avg_price")]
    pub average_price: Decimal,
    #[serde(default)]
    pub pnl: Decimal,
}

impl PortfolioPosition {
    pub fn is_profitable(&self) -> bool {
        self.pnl >= Decimal::ZERO
    }

    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.average_price
    }
}

impl Validate for PortfolioPosition {
    fn validate(&self) -> Result<(), String> {
        require_text("asset", &self.asset)?;
        if self.quantity.is_sign_negative() {
            return Err(format!("{}: quantity must not be negative", self.asset));
        }
        if self.average_price.is_sign_negative() {
            return Err(format!("{}: average_price must not be negative", self.asset));
        }
        Ok(())
    }
}
