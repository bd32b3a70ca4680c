//! PatchNotesService - the main entry point for turning update posts into chat messages.

use patchook_core::{build_lines, char_len, links_header, pack, Limits, PatchInfo, Payload};
use tracing::{debug, trace};

use crate::config::Config;
use crate::flatten::flatten;
use crate::metadata::is_post_body;
use crate::node::Node;
use crate::normalize::{normalize, EmbedResolver, NoEmbeds};
use crate::options::TranscodeOptions;
use crate::rules::{Context, Rule, Rules};
use crate::style::translate;
use crate::webhook::{WebhookConfig, WebhookMessage};
use crate::{PatchookError, Result};

/// The main service: normalize, translate, build lines, pack
#[derive(Debug)]
pub struct PatchNotesService {
    options: TranscodeOptions,
    limits: Limits,
    rules: Rules,
}

impl PatchNotesService {
    /// Create a new PatchNotesService with default options
    pub fn new() -> Self {
        Self::with_options(TranscodeOptions::default())
    }

    /// Create a PatchNotesService with custom options
    pub fn with_options(options: TranscodeOptions) -> Self {
        Self {
            options,
            limits: Limits::default(),
            rules: Rules::new(),
        }
    }

    /// Create a PatchNotesService from a loaded configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            options: config.transcode.clone(),
            limits: config.limits.clone(),
            rules: Rules::new(),
        }
    }

    /// Add a rule that runs after the built-in rules
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.add(rule);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut TranscodeOptions {
        &mut self.options
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Run the Document Normalizer over `root`.
    pub fn normalize(&self, root: &mut Node, resolver: &dyn EmbedResolver) {
        let cx = Context {
            options: &self.options,
            resolver,
        };
        normalize(root, &self.rules, &cx);
    }

    /// Run the Inline Style Translator over `root`.
    pub fn translate(&self, root: &mut Node) {
        translate(root, &self.options);
    }

    /// Transcode a post body into finished lines, leaving embeds unresolved.
    pub fn transcode(&self, root: Node) -> Vec<String> {
        self.transcode_with(root, &NoEmbeds)
    }

    /// Transcode a post body into finished lines.
    pub fn transcode_with(&self, mut root: Node, resolver: &dyn EmbedResolver) -> Vec<String> {
        self.normalize(&mut root, resolver);
        trace!("normalized");
        self.translate(&mut root);
        trace!("translated");

        let text = flatten(&root);
        let lines = build_lines(&text, &self.options.lines);
        debug!(lines = lines.len(), "transcoded post");
        lines
    }

    /// Parse an HTML fragment and transcode it.
    #[cfg(feature = "html")]
    pub fn transcode_html(&self, html: &str) -> Vec<String> {
        self.transcode(crate::html::parse_html(html))
    }

    /// Cut the post body out of a whole update page and transcode it.
    pub fn transcode_post(
        &self,
        mut document: Node,
        resolver: &dyn EmbedResolver,
    ) -> Result<Vec<String>> {
        let classes = &self.options.classes;
        let body = if document
            .as_element()
            .is_some_and(|element| is_post_body(element, classes))
        {
            document
        } else {
            document
                .find_path(|element| is_post_body(element, classes))
                .and_then(|path| document.remove_at(&path))
                .ok_or_else(|| PatchookError::MissingNode("post body section".to_string()))?
        };

        Ok(self.transcode_with(body, resolver))
    }

    /// Pack finished lines into a payload.
    ///
    /// The links section is sent next to the payload and shares its character budget, so
    /// its length is held back on top of the configured reserve.
    pub fn pack<S: AsRef<str>>(&self, lines: &[S], patch: &PatchInfo) -> Payload {
        let header = links_header(&patch.links);
        let mut limits = self.limits.clone();
        limits.reserve += char_len(&header);

        let payload = pack(lines, patch, &limits);
        debug!(
            version = patch.version,
            fields = payload.fields.len(),
            characters = payload.total_characters(),
            "packed payload"
        );
        payload
    }

    /// Pack finished lines and wrap them in the message for `webhook`.
    pub fn message<S: AsRef<str>>(
        &self,
        webhook: &WebhookConfig,
        patch: &PatchInfo,
        lines: &[S],
    ) -> Result<WebhookMessage> {
        webhook.message(patch, self.pack(lines, patch))
    }
}

impl Default for PatchNotesService {
    fn default() -> Self {
        Self::new()
    }
}
