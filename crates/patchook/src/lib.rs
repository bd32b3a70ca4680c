//! # patchook
//!
//! Turn game-update forum posts into chat-flavoured markdown and pack them into webhook
//! payloads that respect the chat API's size limits.
//!
//! ## Design
//!
//! The pipeline works on a small document tree ([`Node`]) that any HTML parser can
//! produce. A post body goes through four stages:
//!
//! - **Normalizer**: a list of [`Rule`]s rewrites the tree in place (title removal, list
//!   depth markers, code fences, spoilers, styled spans, embeds, images, links, breaks)
//!   and escapes every text run.
//! - **Style translator**: bold, italic, headings and friends become markdown templates.
//! - **Line builder** ([`patchook_core::LineBuilder`]): the flattened text becomes
//!   finished lines with bullets, bold list headers and collapsed blank lines.
//! - **Packer** ([`patchook_core::Packer`]): lines are spread over a description and
//!   named fields without breaking the size caps.
//!
//! Fetching pages, resolving embeds over the network and posting the message are left to
//! the caller. Embeds are resolved up front and handed in through an [`EmbedResolver`].
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use patchook::{Node, PatchNotesService};
//!
//! let mut list = Node::element("ul");
//! let mut item = Node::element("li");
//! item.add_child(Node::text("Fixed a crash"));
//! list.add_child(item);
//!
//! let mut body = Node::element("section");
//! let mut heading = Node::element("p");
//! heading.add_child(Node::text("Bug Fixes"));
//! body.add_child(heading);
//! body.add_child(list);
//!
//! let lines = PatchNotesService::new().transcode(body);
//! assert_eq!(lines, vec!["**Bug Fixes**\n", "- Fixed a crash\n"]);
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use patchook::{PatchInfo, PatchNotesService};
//!
//! let service = PatchNotesService::new();
//! let lines = service.transcode_html("<p>Changes</p><ul><li>Faster loading</li></ul>");
//!
//! let patch = PatchInfo { version: 600267, ..PatchInfo::default() };
//! let payload = service.pack(&lines, &patch);
//! assert_eq!(payload.title, "[Game Update] - 600267 (Release)");
//! assert_eq!(payload.description, "**Changes**\n- Faster loading\n");
//! ```

pub mod config;
mod flatten;
#[cfg(feature = "html")]
pub mod html;
pub mod metadata;
pub mod node;
mod normalize;
mod options;
mod rules;
mod service;
mod style;
mod utilities;
pub mod webhook;

pub use config::{Config, LinkIcons};
pub use flatten::{flatten, flatten_nodes};
#[cfg(feature = "html")]
pub use html::{parse_document, parse_html};
pub use metadata::{
    discussion_url, embed_sources, first_image_url, newer_than, newest_version, post_body,
    reward_links, scan_listing, trailer_video_id, youtube_video_id, youtube_watch_url, LdJson,
    PageMetadata, PatchListing, TrailerPolicy, VideoInfo,
};
pub use node::{Element, Node, MARKDOWN_TAG};
pub use normalize::{normalize, EmbedResolver, NoEmbeds};
pub use options::{ClassNames, TranscodeOptions};
pub use rules::{
    document_rules, quote_lines, ApplyFn, Context, Filter, Outcome, PredicateFn, Rule, Rules,
};
pub use service::PatchNotesService;
pub use style::{apply_template, translate};
pub use utilities::*;
pub use webhook::{link_buttons, WebhookConfig, WebhookMessage};

pub use patchook_core::{
    build_lines, char_len, links_header, pack, Author, AuxLink, Field, Footer, Image, LineOptions,
    Limits, LinkKind, PatchInfo, PatchTag, Payload,
};

/// Error type for patchook operations
#[derive(Debug, thiserror::Error)]
pub enum PatchookError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing node: {0}")]
    MissingNode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid icon: {0}")]
    InvalidIcon(String),
}

pub type Result<T> = std::result::Result<T, PatchookError>;

/// Transcode a post body with the default options; embeds stay unresolved.
pub fn transcode(root: Node) -> Vec<String> {
    PatchNotesService::new().transcode(root)
}
