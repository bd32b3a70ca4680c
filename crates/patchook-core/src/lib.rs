//! patchook-core - line building and payload packing
//!
//! This crate holds the two line-oriented stages of the patch-notes pipeline. It knows
//! nothing about document trees: it consumes the flattened text of an already normalised
//! post and produces a size-bounded chat payload.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐               ┌────────────┐
//! flattened text ─▶ LineBuilder  │ ─▶ lines ────▶│   Packer   │ ─▶ Payload
//!                 └──────────────┘               └────────────┘
//!                                     PatchInfo ─────▲
//! ```
//!
//! # Example
//!
//! ```rust
//! use patchook_core::{build_lines, pack, Limits, LineOptions, PatchInfo};
//!
//! let lines = build_lines("Changes\n\t\tFixed a crash\n", &LineOptions::default());
//! assert_eq!(lines, vec!["**Changes**\n", "- Fixed a crash\n"]);
//!
//! let payload = pack(&lines, &PatchInfo::default(), &Limits::default());
//! assert!(payload.description.contains("Fixed a crash"));
//! ```

mod builder;
mod limits;
mod line;
mod pack;
mod patch;
mod payload;

pub use builder::{build_lines, LineBuilder};
pub use limits::Limits;
pub use line::{char_len, indentation_of, list_prefix, LineOptions, LineRecord};
pub use pack::{pack, PackedContent, Packer};
pub use patch::{links_header, with_default_scheme, Author, AuxLink, LinkKind, PatchInfo, PatchTag};
pub use payload::{Field, Footer, Image, Payload};
