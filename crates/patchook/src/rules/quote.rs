//! Line quoting for spoiler regions and indented paragraphs.

use crate::node::{Element, Node};
use crate::utilities::{is_block, is_web_address, split_leading_whitespace};

/// Insert `marker` before the first visible character of every line below `element`.
///
/// Inline elements (links, images, styled spans) are quoted as a whole so the marker
/// never ends up inside link text. A line that already opens with substituted markdown
/// starting with the marker is left alone.
pub fn quote_lines(element: &mut Element, marker: &str) {
    let mut quoter = Quoter {
        marker,
        at_line_start: true,
    };
    quoter.children(&mut element.children);
}

struct Quoter<'m> {
    marker: &'m str,
    at_line_start: bool,
}

impl Quoter<'_> {
    fn children(&mut self, children: &mut Vec<Node>) {
        let mut rebuilt = Vec::with_capacity(children.len() + 1);
        for child in children.drain(..) {
            match child {
                Node::Text(text) => self.text(&text, &mut rebuilt),
                Node::Element(mut element) => {
                    self.element(&mut element, &mut rebuilt);
                    rebuilt.push(Node::Element(element));
                }
            }
        }
        *children = rebuilt;
    }

    fn element(&mut self, element: &mut Element, out: &mut Vec<Node>) {
        if element.tag == "br" {
            self.at_line_start = true;
            return;
        }

        if element.is_markdown() {
            let content = element.text_content();
            if self.at_line_start && !content.trim().is_empty() {
                if !self.is_quoted(&content) {
                    out.push(Node::markdown(self.marker));
                }
                self.at_line_start = false;
            }
            if content.ends_with('\n') {
                self.at_line_start = true;
            }
            return;
        }

        if is_block(&element.tag) {
            self.at_line_start = true;
            if element.tag != "pre" {
                self.children(&mut element.children);
            }
            self.at_line_start = true;
            return;
        }

        if self.at_line_start && has_visible_content(element) {
            out.push(Node::markdown(self.marker));
            self.at_line_start = false;
        }
        self.children(&mut element.children);
    }

    fn text(&mut self, text: &str, out: &mut Vec<Node>) {
        let mut pending = String::new();

        for piece in text.split_inclusive('\n') {
            let (lead, rest) = split_leading_whitespace(piece);
            if self.at_line_start && !rest.is_empty() {
                pending.push_str(lead);
                if !pending.is_empty() {
                    out.push(Node::Text(std::mem::take(&mut pending)));
                }
                out.push(Node::markdown(self.marker));
                pending.push_str(rest);
                self.at_line_start = false;
            } else {
                pending.push_str(piece);
            }

            if piece.ends_with('\n') {
                self.at_line_start = true;
            }
        }

        if !pending.is_empty() {
            out.push(Node::Text(pending));
        }
    }

    fn is_quoted(&self, markdown: &str) -> bool {
        let marker = self.marker.trim();
        !marker.is_empty() && markdown.trim_start().starts_with(marker)
    }
}

/// Whether an inline element renders anything, now or once later rules rewrite it.
fn has_visible_content(element: &Element) -> bool {
    match element.tag.as_str() {
        "img" => ["title", "alt"]
            .iter()
            .filter_map(|name| element.attr(name))
            .any(|description| !description.trim().is_empty()),
        "iframe" => true,
        "a" if element.attr("href").is_some_and(is_web_address) => true,
        _ => element.children.iter().any(|child| match child {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(child) => has_visible_content(child),
        }),
    }
}
