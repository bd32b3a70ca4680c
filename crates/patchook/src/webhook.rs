//! Webhook message assembly.
//!
//! Turns a packed [`Payload`] into the message body a chat webhook accepts, following the
//! per-webhook settings. Sending the message is the caller's business.

use indexmap::IndexMap;
use patchook_core::{links_header, AuxLink, PatchInfo, Payload};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PatchookError, Result};

const ACTION_ROW: u8 = 1;
const BUTTON: u8 = 2;
const LINK_STYLE: u8 = 5;

/// Kinds of update a webhook does not want to hear about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreFlags {
    pub beta: bool,
    pub release: bool,
    pub hotfix: bool,
    pub major: bool,
}

/// A forum tag id, written either as a number or as a string of digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Snowflake {
    Id(u64),
    Text(String),
}

impl Snowflake {
    pub fn id(&self) -> Result<u64> {
        match self {
            Snowflake::Id(id) => Ok(*id),
            Snowflake::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| PatchookError::InvalidConfig(format!("invalid tag id {text:?}"))),
        }
    }
}

/// Settings of one webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub enabled: bool,
    /// Posts into a forum channel, which needs a thread name
    pub forum: bool,
    /// Owned by an application, so it may send buttons
    pub application_owned: bool,
    /// Only announce updates that come with a trailer
    pub video_only: bool,
    /// Line put above the links section
    pub custom_patch_header: Option<String>,
    /// Tag name (`major`, `hotfix`, `beta`, `release`) → forum tag id
    pub available_tags: Option<IndexMap<String, Snowflake>>,
    pub ignore: IgnoreFlags,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            enabled: true,
            forum: false,
            application_owned: false,
            video_only: false,
            custom_patch_header: None,
            available_tags: None,
            ignore: IgnoreFlags::default(),
        }
    }
}

impl WebhookConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(PatchookError::InvalidConfig(
                "every webhook needs a url".to_string(),
            ));
        }
        for (name, id) in self.available_tags.iter().flatten() {
            id.id().map_err(|_| {
                PatchookError::InvalidConfig(format!("invalid id for forum tag {name:?}"))
            })?;
        }
        Ok(())
    }

    /// Whether this webhook announces `patch`.
    pub fn accepts(&self, patch: &PatchInfo) -> bool {
        let ignore = &self.ignore;
        let skip = !self.enabled
            || (patch.hotfix && ignore.hotfix && ignore.beta)
            || (patch.beta && ignore.beta)
            || (patch.is_release() && ignore.release && ignore.major)
            || (patch.is_major() && ignore.major)
            || (self.video_only && !patch.has_trailer());

        if skip {
            debug!(version = patch.version, "webhook skips update");
        }
        !skip
    }

    /// Build the message announcing `patch`.
    pub fn message(&self, patch: &PatchInfo, payload: Payload) -> Result<WebhookMessage> {
        let mut message = WebhookMessage {
            embeds: vec![payload],
            ..WebhookMessage::default()
        };

        if self.forum {
            message.thread_name = Some(patch.title());
        }

        if let Some(available) = &self.available_tags {
            let mut applied = Vec::new();
            for tag in patch.tags() {
                if let Some(id) = available.get(tag.as_str()) {
                    applied.push(id.id()?);
                }
            }
            message.applied_tags = Some(applied);
        }

        if self.application_owned {
            let buttons = link_buttons(&patch.links)?;
            if !buttons.is_empty() {
                message.components = Some(vec![ActionRow::new(buttons)]);
            }
        } else {
            message.content = Some(links_header(&patch.links));
        }

        if let (Some(header), Some(content)) = (&self.custom_patch_header, &mut message.content) {
            if !content.is_empty() {
                *content = format!("{header}\n{content}");
            }
        }

        Ok(message)
    }
}

/// Body of a webhook request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub embeds: Vec<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<Vec<u64>>,
}

impl WebhookMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A row of message components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn new(components: Vec<Button>) -> Self {
        Self {
            kind: ACTION_ROW,
            components,
        }
    }
}

/// A link button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub label: String,
    pub style: u8,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
}

impl Button {
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: BUTTON,
            label: label.into(),
            style: LINK_STYLE,
            url: url.into(),
            emoji: None,
        }
    }
}

/// A custom emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub id: u64,
    pub name: String,
    pub animated: bool,
}

impl Emoji {
    /// Parse an emoji token: `<:name:id>` or, animated, `<a:name:id>`.
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || PatchookError::InvalidIcon(token.to_string());

        let inner = token
            .trim()
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(invalid)?;
        let mut parts = inner.split(':');
        let (Some(flag), Some(name), Some(id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if name.is_empty() || !matches!(flag, "" | "a") {
            return Err(invalid());
        }

        Ok(Self {
            id: id.parse().map_err(|_| invalid())?,
            name: name.to_string(),
            animated: flag == "a",
        })
    }
}

/// One link button per auxiliary link, with its icon as emoji.
pub fn link_buttons(links: &[AuxLink]) -> Result<Vec<Button>> {
    links
        .iter()
        .map(|link| -> Result<Button> {
            let mut button = Button::link(link.label(), link.url.clone());
            button.emoji = link.icon.as_deref().map(Emoji::parse).transpose()?;
            Ok(button)
        })
        .collect()
}
