//! Rules for the markup of game-update posts.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::quote::quote_lines;
use super::{Context, Filter, Outcome, Rule};
use crate::flatten::flatten_nodes;
use crate::metadata::{youtube_video_id, youtube_watch_url};
use crate::node::{Element, Node};
use crate::utilities::{
    collapse_whitespace, encode_link_target, escape_markdown, expand_tabs, is_web_address,
    split_leading_whitespace,
};

static FONT_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*(\d+(?:\.\d+)?)px\s*;?").expect("valid font-size pattern")
});

static MARGIN_LEFT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)margin-left\s*:\s*(\d+(?:\.\d+)?)px").expect("valid margin pattern")
});

/// Create all document rules, in the order they must run
pub fn document_rules() -> Vec<Rule> {
    vec![
        preformatted_rule(),
        spoiler_rule(),
        font_size_rule(),
        indented_paragraph_rule(),
        embed_rule(),
        image_rule(),
        link_rule(),
        line_break_rule(),
    ]
}

fn preformatted_rule() -> Rule {
    Rule::for_tag("pre", |element, cx| {
        let fence = cx.options.lines.fence.as_str();
        let body = flatten_nodes(&element.children);
        if fence.is_empty() || body.trim_start().starts_with(fence) {
            return Outcome::Keep;
        }

        let body = expand_tabs(body.trim_matches('\n'), cx.options.tab_width);
        element.children = vec![Node::Text(format!("{fence}\n{body}\n{fence}"))];
        Outcome::Keep
    })
}

fn spoiler_rule() -> Rule {
    Rule::new(
        "spoiler",
        Filter::predicate(|tag, element, options| {
            tag == "div" && element.has_class(&options.classes.spoiler)
        }),
        |element, cx| {
            let header = cx.options.classes.spoiler_header.as_str();
            remove_descendants(element, &|child| child.has_class(header));
            quote_lines(element, &cx.options.quote_marker);
            Outcome::Keep
        },
    )
}

fn font_size_rule() -> Rule {
    Rule::new(
        "font-size",
        Filter::predicate(|tag, element, _| tag == "span" && font_size(element).is_some()),
        |element, cx| {
            let Some(size) = font_size(element) else {
                return Outcome::Keep;
            };
            strip_font_size(element);

            if element.text_content().trim().is_empty() {
                return Outcome::Keep;
            }
            let marker = if size > cx.options.default_font_size {
                &cx.options.heading_marker
            } else {
                &cx.options.subtext_marker
            };
            prefix_markdown(element, marker);
            element.children.push(Node::markdown("\n"));
            Outcome::Keep
        },
    )
}

fn indented_paragraph_rule() -> Rule {
    Rule::new(
        "indented-paragraph",
        Filter::predicate(|tag, element, _| tag == "p" && margin_left(element) > 0.0),
        |element, cx| {
            quote_lines(element, &cx.options.quote_marker);
            Outcome::Keep
        },
    )
}

fn embed_rule() -> Rule {
    Rule::new(
        "embed",
        Filter::predicate(|tag, element, options| {
            tag == "iframe"
                && (element.has_class(&options.classes.embed)
                    || embed_source(element).and_then(youtube_video_id).is_some())
        }),
        |element, cx| {
            let Some(src) = embed_source(element) else {
                return Outcome::Keep;
            };
            let link = match youtube_video_id(src) {
                Some(id) => Some(youtube_watch_url(id)),
                None => cx.resolver.resolve(src),
            };

            match link {
                Some(link) => Outcome::Replace(vec![Node::markdown(format!(" {}", link.trim()))]),
                None => {
                    debug!(src, "embed left unresolved");
                    Outcome::Keep
                }
            }
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |element, _| {
        let description = ["title", "alt"]
            .iter()
            .filter_map(|name| element.attr(name))
            .map(str::trim)
            .find(|description| !description.is_empty());

        match description {
            Some(description) => {
                let description = escape_markdown(&collapse_whitespace(description));
                Outcome::Replace(vec![Node::Text(description)])
            }
            None => {
                let src = element.attr("src").unwrap_or_default();
                trace!(src, "dropping image without description");
                Outcome::Remove
            }
        }
    })
}

fn link_rule() -> Rule {
    Rule::new(
        "link",
        Filter::predicate(|tag, element, _| tag == "a" && element.attr("href").is_some()),
        |element, _| {
            let href = element.remove_attr("href").unwrap_or_default();
            let url = href.trim();
            if url.is_empty() {
                return Outcome::Keep;
            }

            let text = element.text_content();
            if text.trim().is_empty() {
                if is_web_address(url) {
                    return Outcome::Replace(vec![Node::markdown(url)]);
                }
                return Outcome::Keep;
            }

            let leading = take_leading_whitespace(&mut element.children);
            let mut replacement = Vec::with_capacity(2);
            if !leading.is_empty() {
                replacement.push(Node::Text(leading));
            }

            if is_web_address(text.trim()) {
                replacement.push(Node::markdown(url));
            } else {
                element.children.insert(0, Node::markdown("["));
                element
                    .children
                    .push(Node::markdown(format!("]({})", encode_link_target(url))));
                replacement.push(Node::Element(std::mem::take(element)));
            }
            Outcome::Replace(replacement)
        },
    )
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _| Outcome::Replace(vec![Node::markdown("\n")]))
}

/// Where an embed placeholder points to
fn embed_source(element: &Element) -> Option<&str> {
    ["src", "data-embed-src"]
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::trim)
        .find(|src| !src.is_empty())
}

fn font_size(element: &Element) -> Option<f32> {
    let style = element.attr("style")?;
    FONT_SIZE.captures(style)?.get(1)?.as_str().parse().ok()
}

fn strip_font_size(element: &mut Element) {
    let rest = match element.attr("style") {
        Some(style) => FONT_SIZE
            .replace_all(style, "")
            .trim()
            .trim_matches(';')
            .trim()
            .to_string(),
        None => return,
    };
    if rest.is_empty() {
        element.remove_attr("style");
    } else {
        element.set_attr("style", &rest);
    }
}

fn margin_left(element: &Element) -> f32 {
    element
        .attr("style")
        .and_then(|style| MARGIN_LEFT.captures(style))
        .and_then(|captures| captures.get(1))
        .and_then(|size| size.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Drop every element below `element` matching `predicate`.
fn remove_descendants(element: &mut Element, predicate: &dyn Fn(&Element) -> bool) {
    let mut stack = vec![element];
    while let Some(element) = stack.pop() {
        element.children.retain(|child| match child {
            Node::Element(child) => !predicate(child),
            Node::Text(_) => true,
        });
        for child in element.children.iter_mut() {
            if let Node::Element(child) = child {
                stack.push(child);
            }
        }
    }
}

/// Put `marker` in front of the element's text, after any leading whitespace.
fn prefix_markdown(element: &mut Element, marker: &str) {
    let leading = take_leading_whitespace(&mut element.children);
    element.children.insert(0, Node::markdown(marker));
    if !leading.is_empty() {
        element.children.insert(0, Node::Text(leading));
    }
}

/// Remove the whitespace the first text children start with and return it, collapsed.
fn take_leading_whitespace(children: &mut Vec<Node>) -> String {
    let mut leading = String::new();
    while let Some(Node::Text(text)) = children.first_mut() {
        let (lead, rest) = split_leading_whitespace(text);
        leading.push_str(lead);
        if rest.is_empty() {
            children.remove(0);
        } else {
            *text = rest.to_string();
            break;
        }
    }
    collapse_whitespace(&leading)
}
