use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{require_text, Validate};

/// Strategy record from `GET /strategies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Backend fields not modelled here; sent back untouched on update
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Strategy {
    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// Full record with the activation flag flipped, as sent by `PUT /strategies/{id}`
    pub fn toggled(&self) -> Self {
        Self {
            is_active: !self.is_active,
            ..self.clone()
        }
    }
}

impl Validate for Strategy {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }
}

/// Body of `POST /strategies/`; new strategies always start inactive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStrategy {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl NewStrategy {
    pub fn new(name: &str, description: &str) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Strategy name is required.".to_string());
        }
        Ok(Self {
            name: name.to_string(),
            description: description.trim().to_string(),
            is_active: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggled_keeps_other_fields() {
        let strategy = Strategy {
            id: 3,
            name: "Mean reversion".into(),
            description: Some("buy dips".into()),
            is_active: false,
            extra: Default::default(),
        };
        let flipped = strategy.toggled();
        assert!(flipped.is_active);
        assert_eq!(flipped.id, 3);
        assert_eq!(flipped.description.as_deref(), Some("buy dips"));
        assert_eq!(flipped.status_label(), "Active");
    }

    #[test]
    fn test_new_strategy_requires_name() {
        assert_eq!(
            NewStrategy::new("   ", "anything").unwrap_err(),
            "Strategy name is required."
        );
        let created = NewStrategy::new(" Breakout ", "").unwrap();
        assert_eq!(created.name, "Breakout");
        assert!(!created.is_active);
    }

    #[test]
    fn test_strategy_decodes_without_optional_fields() {
        let strategy: Strategy = serde_json::from_str(r#"{"id":1,"name":"Momentum"}"#).unwrap();
        assert!(!strategy.is_active);
        assert!(strategy.description.is_none());
    }
}
