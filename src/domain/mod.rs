//! Typed contracts for the records exchanged with the backend.
//!
//! Every payload decoded by the API client must also pass [`Validate`];
//! anything that does not is rejected before it reaches a page.

pub mod account;
pub mod backtest;
pub mod market;
pub mod notification;
pub mod portfolio;
pub mod strategy;

pub use account::*;
pub use backtest::*;
pub use market::*;
pub use notification::*;
pub use portfolio::*;
pub use strategy::*;

/// Record-level invariants checked after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        for (idx, item) in self.iter().enumerate() {
            item.validate().map_err(|e| format!("item {idx}: {e}"))?;
        }
        Ok(())
    }
}

/// Reject blank strings in required fields
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}
