use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured interpretation of one chat message
///
/// Produced by the NLU collaborator. Every field is optional on the wire:
/// missing fields default and malformed actions are dropped one by one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    pub topic: String,
    pub message: String,
    pub actions: Vec<PlanAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanAction {
    UpdateProfile {
        #[serde(default)]
        patch: Value,
    },
    Recommend {
        #[serde(default)]
        pin_ids: Value,
        #[serde(default)]
        items: Value,
    },
    #[serde(other)]
    Unknown,
}

impl Plan {
    pub fn new(topic: &str, message: &str, actions: Vec<PlanAction>) -> Self {
        Self {
            topic: topic.to_string(),
            message: message.to_string(),
            actions,
        }
    }

    /// Decode a plan from arbitrary JSON without ever failing
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let actions = value
            .get("actions")
            .and_then(Value::as_array)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(|a| serde_json::from_value::<PlanAction>(a.clone()).ok())
                    .filter(|a| *a != PlanAction::Unknown)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            topic: text("topic"),
            message: text("message"),
            actions,
        }
    }

    pub fn wants_recommendation(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, PlanAction::Recommend { .. }))
    }
}
