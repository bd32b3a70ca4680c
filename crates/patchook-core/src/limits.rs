//! Capacity limits imposed by the downstream chat API.

use serde::{Deserialize, Serialize};

/// Size caps for a packed payload.
///
/// The defaults are the exact limits of the chat API's embed object and must not be
/// raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum characters in the description
    pub description: usize,
    /// Maximum characters in a single field value
    pub field_value: usize,
    /// Maximum characters in a single field name
    pub field_name: usize,
    /// Maximum number of fields
    pub max_fields: usize,
    /// Maximum characters across the whole embed
    pub total: usize,
    /// Characters held back for title, author and footer
    pub reserve: usize,
    /// Marker appended when content is cut off
    pub ellipsis: String,
}

impl Limits {
    /// Characters available to description and fields together.
    pub fn content_budget(&self) -> usize {
        self.total.saturating_sub(self.reserve)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            description: 4050,
            field_value: 1024,
            field_name: 256,
            max_fields: 25,
            total: 6000,
            reserve: 250,
            ellipsis: "...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        assert_eq!(Limits::default().content_budget(), 5750);
    }

    #[test]
    fn test_partial_override() {
        let limits: Limits = serde_json::from_str(r#"{"max_fields": 10}"#).unwrap();
        assert_eq!(limits.max_fields, 10);
        assert_eq!(limits.description, 4050);
    }
}
