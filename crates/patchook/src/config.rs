//! Configuration file.
//!
//! A single JSON document holds everything: transcoding options, payload limits, link icons
//! and the list of webhooks. Every section is optional and falls back to its defaults.

use std::path::Path;

use patchook_core::{Limits, LinkKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metadata::TrailerPolicy;
use crate::options::TranscodeOptions;
use crate::webhook::WebhookConfig;
use crate::{PatchookError, Result};

/// Updates announced per run
const MAX_ANNOUNCEMENTS: usize = 15;
/// Updates announced per run in debug mode
const MAX_ANNOUNCEMENTS_DEBUG: usize = 50;

/// Custom emoji tokens shown in front of each kind of link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkIcons {
    pub trailer: Option<String>,
    pub discussion: Option<String>,
    pub reward: Option<String>,
}

impl LinkIcons {
    pub fn icon_for(&self, kind: LinkKind) -> Option<String> {
        match kind {
            LinkKind::Trailer => self.trailer.clone(),
            LinkKind::Discussion => self.discussion.clone(),
            LinkKind::Reward => self.reward.clone(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug_mode: bool,
    pub transcode: TranscodeOptions,
    pub limits: Limits,
    pub icons: LinkIcons,
    pub trailer: TrailerPolicy,
    pub webhooks: Vec<WebhookConfig>,
}

impl Config {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(PatchookError::InvalidConfig(
                "configuration is empty".to_string(),
            ));
        }
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        debug!(webhooks = config.webhooks.len(), "configuration loaded");
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.reserve >= self.limits.total {
            return Err(PatchookError::InvalidConfig(format!(
                "reserve of {} leaves no room within the total of {}",
                self.limits.reserve, self.limits.total
            )));
        }
        if self.limits.max_fields == 0 && self.limits.description == 0 {
            return Err(PatchookError::InvalidConfig(
                "limits leave no region for content".to_string(),
            ));
        }
        for webhook in &self.webhooks {
            webhook.validate()?;
        }
        Ok(())
    }

    /// Webhooks that are switched on
    pub fn enabled_webhooks(&self) -> impl Iterator<Item = &WebhookConfig> {
        self.webhooks.iter().filter(|webhook| webhook.enabled)
    }

    /// How many updates a single run may announce
    pub fn max_announcements(&self) -> usize {
        if self.debug_mode {
            MAX_ANNOUNCEMENTS_DEBUG
        } else {
            MAX_ANNOUNCEMENTS
        }
    }
}
