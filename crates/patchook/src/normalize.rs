//! Document Normalizer.
//!
//! Rewrites a post body in place so that flattening it yields the raw lines the Line
//! Builder expects: the page title is gone, whitespace is collapsed, list items carry depth
//! markers, text is escaped and every supported construct has been replaced by substituted
//! markdown. Line breaks only come from `br` and block boundaries, never from the way the
//! page source was indented.
//!
//! Normalizing is total and idempotent. Unexpected structure is left as it is.

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::node::{Element, Node};
use crate::options::TranscodeOptions;
use crate::rules::{is_opaque, Context, Rules};
use crate::utilities::{collapse_whitespace, escape_markdown, is_block, is_list};

/// Resolves embed placeholder sources to the link they stand for.
///
/// Resolution usually needs network access, so the caller resolves every source found by
/// [`embed_sources`](crate::embed_sources) before normalizing and hands the results in
/// through this trait. `None` leaves the placeholder untouched.
pub trait EmbedResolver {
    fn resolve(&self, src: &str) -> Option<String>;
}

/// Resolver that knows no links.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmbeds;

impl EmbedResolver for NoEmbeds {
    fn resolve(&self, _src: &str) -> Option<String> {
        None
    }
}

impl<S: BuildHasher> EmbedResolver for HashMap<String, String, S> {
    fn resolve(&self, src: &str) -> Option<String> {
        self.get(src).cloned()
    }
}

impl<S: BuildHasher> EmbedResolver for IndexMap<String, String, S> {
    fn resolve(&self, src: &str) -> Option<String> {
        self.get(src).cloned()
    }
}

impl<F> EmbedResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, src: &str) -> Option<String> {
        self(src)
    }
}

/// Normalize the tree below `root`.
///
/// Depth markers are placed last so they land in front of whatever the rules left as the
/// first text of each list item.
pub fn normalize(root: &mut Node, rules: &Rules, cx: &Context<'_>) {
    remove_page_title(root, cx.options);
    clean_text(root);
    rules.apply(root, cx);
    mark_list_depth(root, cx.options);
}

/// Remove the first heading carrying the page title class.
fn remove_page_title(root: &mut Node, options: &TranscodeOptions) {
    let class = options.classes.page_title.as_str();
    let path = root.find_path(|element| is_heading(&element.tag) && element.has_class(class));

    match path {
        Some(path) => {
            root.remove_at(&path);
            trace!("removed page title");
        }
        None => debug!("no page title to remove"),
    }
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Collapse the source formatting whitespace of every text run outside code and
/// substituted markdown, then escape it.
fn clean_text(root: &mut Node) {
    let mut stack: Vec<&mut Node> = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Node::Text(text) => *text = escape_markdown(&collapse_whitespace(text)),
            Node::Element(element) => {
                if !is_opaque(element) {
                    stack.extend(element.children.iter_mut());
                }
            }
        }
    }
}

/// Give each list item the marker for its nesting depth.
fn mark_list_depth(root: &mut Node, options: &TranscodeOptions) {
    let Node::Element(root) = root else {
        return;
    };
    let mut stack: Vec<(&mut Element, usize)> = vec![(root, 0)];

    while let Some((element, depth)) = stack.pop() {
        let depth = if is_list(&element.tag) { depth + 1 } else { depth };
        if element.tag == "li" && depth > 0 {
            let marker = options.lines.indent_marker.repeat(depth);
            if !place_marker(&mut element.children, &marker) {
                trace!(depth, "list item without leading text");
            }
        }
        for child in element.children.iter_mut() {
            if let Node::Element(child) = child {
                if !is_opaque(child) {
                    stack.push((child, depth));
                }
            }
        }
    }
}

/// Put the depth marker in front of a list item's first text.
///
/// Leading whitespace is dropped first, which also drops a marker placed by an earlier
/// run. Returns `false` when the item opens with a nested list or code block (or has no
/// content), in which case it stays unmarked.
fn place_marker(children: &mut Vec<Node>, marker: &str) -> bool {
    while let Some(Node::Text(text)) = children.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            children.remove(0);
        } else {
            *text = format!("{marker}{trimmed}");
            return true;
        }
    }

    match children.first_mut() {
        Some(Node::Element(element)) => match element.tag.as_str() {
            "ul" | "ol" | "pre" => false,
            tag if is_block(tag) => place_marker(&mut element.children, marker),
            _ => {
                children.insert(0, Node::Text(marker.to_string()));
                true
            }
        },
        _ => false,
    }
}
