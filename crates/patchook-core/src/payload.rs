//! The packed chat payload (an embed object).

use serde::{Deserialize, Serialize};

use crate::line::char_len;
use crate::patch::Author;

/// A named block of content following the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    /// Create a field with an empty value
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
        }
    }
}

/// Footer block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    pub text: String,
}

/// Large image shown under the embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// A size-bounded message payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub title: String,
    pub url: String,
    pub timestamp: String,
    pub color: u32,
    pub author: Author,
    pub description: String,
    pub fields: Vec<Field>,
    pub footer: Footer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Payload {
    /// Characters in the description plus every field name and value.
    pub fn total_characters(&self) -> usize {
        char_len(&self.description)
            + self
                .fields
                .iter()
                .map(|field| char_len(&field.name) + char_len(&field.value))
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_characters() {
        let payload = Payload {
            description: "abc".to_string(),
            fields: vec![
                Field {
                    name: "Fixes".to_string(),
                    value: "- one\n".to_string(),
                },
                Field::named(""),
            ],
            ..Payload::default()
        };
        assert_eq!(payload.total_characters(), 3 + 5 + 6);
    }

    #[test]
    fn test_image_is_omitted_when_absent() {
        let json = serde_json::to_value(Payload::default()).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["footer"]["text"], "");
        assert!(json["fields"].as_array().unwrap().is_empty());
    }
}
