//! Flattening: the normalized tree as plain text, one raw line per output line.

use crate::node::Node;
use crate::utilities::{is_block, is_skipped};

enum Step<'a> {
    Enter(&'a Node),
    LeaveBlock,
}

/// Render a node and its descendants to text.
///
/// Block elements start on a fresh line and end with a newline, `br` becomes a newline
/// and unrendered elements (`script`, `style`, ...) are skipped.
pub fn flatten(node: &Node) -> String {
    flatten_nodes(std::slice::from_ref(node))
}

/// Render a sequence of sibling nodes to text.
pub fn flatten_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    let mut stack: Vec<Step> = nodes.iter().rev().map(Step::Enter).collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(Node::Text(text)) => out.push_str(text),
            Step::Enter(Node::Element(element)) => {
                if is_skipped(&element.tag) {
                    continue;
                }
                if element.tag == "br" {
                    out.push('\n');
                    continue;
                }
                if is_block(&element.tag) {
                    begin_block(&mut out);
                    stack.push(Step::LeaveBlock);
                }
                stack.extend(element.children.iter().rev().map(Step::Enter));
            }
            Step::LeaveBlock => end_block(&mut out),
        }
    }

    out
}

/// Whitespace left on the current line before a block is formatting noise.
fn begin_block(out: &mut String) {
    let line_start = out.rfind('\n').map_or(0, |index| index + 1);
    if out[line_start..].trim().is_empty() {
        out.truncate(line_start);
    } else {
        out.push('\n');
    }
}

fn end_block(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, children: Vec<Node>) -> Node {
        let mut node = Node::element(tag);
        for child in children {
            node.add_child(child);
        }
        node
    }

    #[test]
    fn test_inline_text() {
        let p = element(
            "p",
            vec![Node::text("Hello "), element("strong", vec![Node::text("World")])],
        );
        assert_eq!(flatten(&p), "Hello World\n");
    }

    #[test]
    fn test_blocks_start_new_lines() {
        let div = element(
            "div",
            vec![
                Node::text("intro"),
                element("p", vec![Node::text("one")]),
                element("p", vec![Node::text("two")]),
                Node::text("outro"),
            ],
        );
        assert_eq!(flatten(&div), "intro\none\ntwo\noutro\n");
    }

    #[test]
    fn test_formatting_whitespace_before_block_is_dropped() {
        let ul = element(
            "ul",
            vec![
                Node::text("\n    "),
                element("li", vec![Node::text("\t\titem")]),
                Node::text("\n"),
            ],
        );
        assert_eq!(flatten(&ul), "\n\t\titem\n\n");
    }

    #[test]
    fn test_line_breaks() {
        let p = element("p", vec![Node::text("a"), Node::element("br"), Node::text("b")]);
        assert_eq!(flatten(&p), "a\nb\n");
    }

    #[test]
    fn test_skipped_elements() {
        let div = element(
            "div",
            vec![element("script", vec![Node::text("var x;")]), Node::text("shown")],
        );
        assert_eq!(flatten(&div), "shown\n");
    }

    #[test]
    fn test_markdown_is_inline() {
        let p = element("p", vec![Node::markdown("> "), Node::text("quoted")]);
        assert_eq!(flatten(&p), "> quoted\n");
    }

    #[test]
    fn test_empty() {
        assert_eq!(flatten(&Node::element("div")), "");
        assert_eq!(flatten_nodes(&[]), "");
    }
}
