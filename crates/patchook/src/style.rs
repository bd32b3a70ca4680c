//! Inline Style Translator.
//!
//! Replaces the content of every element with a markdown template (bold, italic, headings,
//! ...) by the template applied to each rendered line. Runs after normalization, so links
//! and quote markers are already literal markdown.

use crate::flatten::flatten_nodes;
use crate::node::{Element, Node};
use crate::options::TranscodeOptions;
use crate::rules::is_opaque;
use crate::utilities::{is_block, is_web_address, split_leading_whitespace};

/// Attribute left on block elements whose content was already translated
const TRANSLATED_ATTR: &str = "data-translated";

/// Apply the tag templates to every element below `root`.
///
/// Inline elements are replaced by the resulting markdown, block elements keep their place
/// so flattening still breaks lines around them. Nested styles compose from the inside out:
/// `<b><i>x</i></b>` becomes `***x***`.
pub fn translate(root: &mut Node, options: &TranscodeOptions) {
    if let Node::Element(element) = root {
        translate_children(element, options);
    }
}

fn translate_children(element: &mut Element, options: &TranscodeOptions) {
    for child in element.children.iter_mut() {
        let Node::Element(styled) = child else {
            continue;
        };
        if is_opaque(styled) || styled.attr(TRANSLATED_ATTR).is_some() {
            continue;
        }
        translate_children(styled, options);

        let Some(template) = options.template(&styled.tag) else {
            continue;
        };
        let rendered = flatten_nodes(&styled.children);
        if rendered.trim().is_empty() {
            continue;
        }

        let markdown = apply_template(template, &rendered, &options.line_markers());
        if is_block(&styled.tag) {
            styled.children = vec![Node::markdown(markdown)];
            styled.set_attr(TRANSLATED_ATTR, "");
        } else {
            *child = Node::markdown(markdown);
        }
    }
}

/// Wrap every line of `text` in `template`.
///
/// Leading whitespace, trailing whitespace and line-opening markers stay outside the
/// template. Blank lines and lines starting with a web address are left alone.
pub fn apply_template(template: &str, text: &str, markers: &[&str]) -> String {
    let mut result = String::with_capacity(text.len() + 8);

    for piece in text.split_inclusive('\n') {
        let (line, newline) = match piece.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (piece, ""),
        };
        let (lead, rest) = split_leading_whitespace(line);
        let (opening, body) = split_markers(rest, markers);
        let core = body.trim_end();
        let trailing = &body[core.len()..];

        if core.is_empty() || is_web_address(core) {
            result.push_str(piece);
            continue;
        }

        result.push_str(lead);
        result.push_str(opening);
        result.push_str(&template.replace("{}", core));
        result.push_str(trailing);
        result.push_str(newline);
    }

    result
}

/// Split the run of line markers (`> `, `## `, ...) off the start of a line.
fn split_markers<'a>(line: &'a str, markers: &[&str]) -> (&'a str, &'a str) {
    let mut rest = line;
    while let Some(after) = markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .find_map(|marker| rest.strip_prefix(*marker))
    {
        rest = after;
    }
    line.split_at(line.len() - rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;

    fn element(tag: &str, children: Vec<Node>) -> Node {
        let mut node = Node::element(tag);
        for child in children {
            node.add_child(child);
        }
        node
    }

    fn translated(mut root: Node) -> String {
        translate(&mut root, &TranscodeOptions::default());
        flatten(&root)
    }

    const MARKERS: [&str; 3] = ["> ", "## ", "-# "];

    #[test]
    fn test_bold_paragraph() {
        let p = element(
            "p",
            vec![Node::text("Hello "), element("strong", vec![Node::text("World")])],
        );
        assert_eq!(translated(element("div", vec![p])), "Hello **World**\n");
    }

    #[test]
    fn test_nested_styles_compose() {
        let b = element("b", vec![element("i", vec![Node::text("both")])]);
        assert_eq!(translated(element("p", vec![b])), "***both***\n");
    }

    #[test]
    fn test_heading_stays_a_block() {
        let div = element(
            "div",
            vec![
                Node::text("intro"),
                element("h2", vec![Node::text("Changes")]),
                Node::text("outro"),
            ],
        );
        assert_eq!(translated(div), "intro\n## Changes\noutro\n");
    }

    #[test]
    fn test_template_per_line() {
        assert_eq!(
            apply_template("**{}**", "  one \n\ntwo\n", &MARKERS),
            "  **one** \n\n**two**\n"
        );
    }

    #[test]
    fn test_web_addresses_are_not_wrapped() {
        assert_eq!(
            apply_template("*{}*", "see\nhttps://example.com/x\n", &MARKERS),
            "*see*\nhttps://example.com/x\n"
        );
    }

    #[test]
    fn test_markers_stay_outside() {
        assert_eq!(apply_template("__{}__", "> ## Title", &MARKERS), "> ## __Title__");
        assert_eq!(apply_template("__{}__", "> ", &MARKERS), "> ");
    }

    #[test]
    fn test_code_is_not_styled() {
        let pre = element("pre", vec![element("b", vec![Node::text("x")])]);
        assert_eq!(translated(element("div", vec![pre])), "x\n");
    }

    #[test]
    fn test_blank_styles_are_kept() {
        let p = element(
            "p",
            vec![Node::text("a"), element("b", vec![Node::text(" ")]), Node::text("b")],
        );
        assert_eq!(translated(p), "a b\n");
    }

    #[test]
    fn test_translating_twice_changes_nothing() {
        let div = element(
            "div",
            vec![
                element("h1", vec![element("em", vec![Node::text("Title")])]),
                element("p", vec![element("u", vec![Node::text("under")]), Node::text(" line")]),
            ],
        );
        let mut once = div.clone();
        translate(&mut once, &TranscodeOptions::default());
        let mut twice = once.clone();
        translate(&mut twice, &TranscodeOptions::default());
        assert_eq!(once, twice);
        assert_eq!(flatten(&once), "# *Title*\n__under__ line\n");
    }
}
