//! Page and fragment parsing with scraper.
//!
//! Update pages and post bodies are parsed into the [`Node`] tree the normalizer rewrites.
//! Only elements and text survive; comments, doctypes and processing instructions are
//! dropped on the way.

use scraper::{ElementRef, Html};

use crate::node::Node;

/// Parse a post body or any other fragment. The result is rooted at an `html` element.
///
/// # Example
///
/// ```rust
/// use patchook::{parse_html, PatchNotesService};
///
/// let body = parse_html("<p>Hello <strong>World</strong></p>");
/// assert_eq!(body.tag_name(), "html");
///
/// let lines = PatchNotesService::new().transcode(body);
/// assert_eq!(lines, vec!["Hello **World**\n"]);
/// ```
pub fn parse_html(html: &str) -> Node {
    to_node(Html::parse_fragment(html).root_element())
}

/// Parse a whole update page, `head` included, so its structured data can be scanned.
pub fn parse_document(html: &str) -> Node {
    to_node(Html::parse_document(html).root_element())
}

fn to_node(element: ElementRef<'_>) -> Node {
    let value = element.value();
    let mut node = Node::element_with_attrs(value.name(), value.attrs().collect());

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            node.add_child(Node::text(text));
        } else if let Some(child) = ElementRef::wrap(child) {
            node.add_child(to_node(child));
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_keeps_elements_and_text() {
        let node = parse_html("<p class=\"a b\">Hello <!-- note --><b>World</b></p>");
        assert_eq!(node.tag_name(), "html");

        let p = node.children().next().unwrap();
        assert_eq!(p.tag_name(), "p");
        assert!(p.has_class("b a"));
        assert_eq!(p.children().count(), 2);
        assert_eq!(p.text_content(), "Hello World");
    }

    #[test]
    fn test_page_keeps_head_and_body() {
        let node = parse_document(
            "<!DOCTYPE html><html><head><title>t</title></head><body><section>x</section></body></html>",
        );
        assert_eq!(node.tag_name(), "html");
        let tags: Vec<&str> = node.element_children().map(Node::tag_name).collect();
        assert_eq!(tags, vec!["head", "body"]);
        assert!(node.find(|element| element.tag == "section").is_some());
    }

    #[test]
    fn test_embed_attributes_survive() {
        let node = parse_html("<iframe data-embed-src=\"https://x.example.com/e\"></iframe>");
        let iframe = node.children().next().unwrap();
        assert_eq!(iframe.attr("data-embed-src"), Some("https://x.example.com/e"));
    }
}
