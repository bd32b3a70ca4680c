//! Rule system for tree normalization.
//!
//! Each rule makes one full pass over the tree, in the order the rules were added. Later
//! rules rely on the output of earlier ones (links see image descriptions, quoting sees
//! line breaks that are still elements), so the order is part of the behavior.

mod document;
mod quote;
mod rule;

pub use document::document_rules;
pub use quote::quote_lines;
pub use rule::{ApplyFn, Context, Filter, Outcome, PredicateFn, Rule};

use tracing::trace;

use crate::node::{Element, Node};

/// Whether a rule pass should look inside an element.
pub(crate) fn is_opaque(element: &Element) -> bool {
    element.is_markdown() || matches!(element.tag.as_str(), "pre" | "script" | "style")
}

/// Ordered collection of normalization rules
#[derive(Debug)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// The built-in rules for game-update posts
    pub fn new() -> Self {
        Self {
            rules: document_rules(),
        }
    }

    /// A rule set without any rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule; it runs after every rule already present
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over the tree below `root`.
    pub fn apply(&self, root: &mut Node, cx: &Context<'_>) {
        let Node::Element(root) = root else {
            return;
        };
        for rule in &self.rules {
            let matched = apply_rule(rule, root, cx);
            if matched > 0 {
                trace!(rule = %rule.name, matched, "rule applied");
            }
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

/// One pass of `rule` over the descendants of `root`. Returns the number of matches.
fn apply_rule(rule: &Rule, root: &mut Element, cx: &Context<'_>) -> usize {
    let mut matched = 0;
    let mut stack: Vec<&mut Element> = vec![root];

    while let Some(element) = stack.pop() {
        let children = std::mem::take(&mut element.children);
        let mut rebuilt = Vec::with_capacity(children.len());

        for child in children {
            match child {
                Node::Element(mut child) if rule.filter.matches(&child, cx.options) => {
                    matched += 1;
                    match rule.run(&mut child, cx) {
                        Outcome::Keep => rebuilt.push(Node::Element(child)),
                        Outcome::Replace(nodes) => rebuilt.extend(nodes),
                        Outcome::Remove => {}
                    }
                }
                other => rebuilt.push(other),
            }
        }

        element.children = rebuilt;
        for child in element.children.iter_mut().rev() {
            if let Node::Element(child) = child {
                if !is_opaque(child) {
                    stack.push(child);
                }
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NoEmbeds;
    use crate::options::TranscodeOptions;

    fn element(tag: &str, children: Vec<Node>) -> Node {
        let mut node = Node::element(tag);
        for child in children {
            node.add_child(child);
        }
        node
    }

    #[test]
    fn test_custom_rule_replaces_nested_matches() {
        let mut rules = Rules::empty();
        rules.add(Rule::for_tag("kbd", |element, _| {
            Outcome::Replace(vec![Node::markdown(format!("`{}`", element.text_content()))])
        }));

        let mut root = element(
            "div",
            vec![element(
                "p",
                vec![Node::text("Press "), element("kbd", vec![Node::text("F1")])],
            )],
        );
        let options = TranscodeOptions::default();
        rules.apply(
            &mut root,
            &Context {
                options: &options,
                resolver: &NoEmbeds,
            },
        );

        assert_eq!(root.text_content(), "Press `F1`");
        assert!(root.find(|element| element.tag == "kbd").is_none());
    }

    #[test]
    fn test_remove_outcome_and_opaque_elements() {
        let mut rules = Rules::empty();
        rules.add(Rule::new(
            "drop-marked",
            Filter::predicate(|_, element, _| element.attr("data-drop").is_some()),
            |_, _| Outcome::Remove,
        ));

        let mut root = element(
            "div",
            vec![
                Node::element_with_attrs("span", vec![("data-drop", "1")]),
                element("pre", vec![Node::element_with_attrs("span", vec![("data-drop", "1")])]),
                Node::text("kept"),
            ],
        );
        let options = TranscodeOptions::default();
        rules.apply(
            &mut root,
            &Context {
                options: &options,
                resolver: &NoEmbeds,
            },
        );

        let tags: Vec<&str> = root.children().map(Node::tag_name).collect();
        assert_eq!(tags, vec!["pre", "#text"]);
        assert_eq!(root.descendants().filter(|node| node.tag_name() == "span").count(), 1);
    }

    #[test]
    fn test_filter_kinds() {
        let options = TranscodeOptions::default();
        let span = Node::element_with_attrs("span", vec![("style", "color:red")]);
        let span = span.as_element().unwrap();
        assert!(Filter::tag("SPAN").matches(span, &options));
        assert!(Filter::tags(&["p", "span"]).matches(span, &options));
        assert!(!Filter::tag("p").matches(span, &options));
        let styled = Filter::predicate(|tag, element, _| {
            tag == "span" && element.attr("style").is_some()
        });
        assert!(styled.matches(span, &options));
    }
}
