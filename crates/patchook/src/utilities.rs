//! Markdown escaping and tag classification helpers.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose content is never rendered
pub const SKIPPED_ELEMENTS: &[&str] = &["head", "noscript", "script", "style", "template", "title"];

/// List containers
pub const LIST_ELEMENTS: &[&str] = &["ol", "ul"];

/// Characters that start chat markdown syntax
pub const MARKDOWN_CONTROL_CHARS: &[char] =
    &['*', '_', '>', '|', '~', '`', '-', '[', ']', '#', '\\'];

const NBSP: char = '\u{a0}';

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag's content is never rendered
pub fn is_skipped(tag: &str) -> bool {
    SKIPPED_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a list container
pub fn is_list(tag: &str) -> bool {
    LIST_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Escape markdown control characters so the text renders literally.
///
/// Non-breaking spaces become ordinary spaces. A control character that is already
/// escaped is left alone, so escaping twice changes nothing.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            NBSP => result.push(' '),
            '\\' => {
                result.push('\\');
                match chars.peek() {
                    Some(&next) if MARKDOWN_CONTROL_CHARS.contains(&next) => {
                        result.push(next);
                        chars.next();
                    }
                    _ => result.push('\\'),
                }
            }
            c if MARKDOWN_CONTROL_CHARS.contains(&c) => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Collapse every run of whitespace (newlines, tabs, non-breaking spaces) into one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Whether the text starts like a web address
pub fn is_web_address(text: &str) -> bool {
    let text = text.trim_start();
    ["http://", "https://", "www."]
        .iter()
        .any(|scheme| {
            text.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
}

/// Replace every tab with `width` spaces
pub fn expand_tabs(text: &str, width: usize) -> String {
    text.replace('\t', &" ".repeat(width))
}

/// Percent-encode the characters that would end a markdown link target early
pub fn encode_link_target(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.trim().chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Split off leading whitespace: `("  ", "text  ")`
pub fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let rest = text.trim_start();
    text.split_at(text.len() - rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown("_test_"), "\\_test\\_");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(
            escape_markdown("# 3 - 4 > 2 | ~x~ `y`"),
            "\\# 3 \\- 4 \\> 2 \\| \\~x\\~ \\`y\\`"
        );
        assert_eq!(escape_markdown("normal (text)."), "normal (text).");
    }

    #[test]
    fn test_escape_replaces_nbsp() {
        assert_eq!(escape_markdown("a\u{a0}b"), "a b");
    }

    #[test]
    fn test_escape_is_idempotent() {
        for text in ["*bold*", "a \\ b", "trailing\\", "\\\\", "C:\\path", "-# sub"] {
            let once = escape_markdown(text);
            assert_eq!(escape_markdown(&once), once, "{text:?}");
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\n\t\t\tPlain  paragraph\n\t\t"), " Plain paragraph ");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(collapse_whitespace(""), "");
        let once = collapse_whitespace("x \t\n y");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn test_escape_lone_backslash() {
        assert_eq!(escape_markdown("C:\\path"), "C:\\\\path");
    }

    #[test]
    fn test_is_block() {
        assert!(is_block("div"));
        assert!(is_block("p"));
        assert!(is_block("DIV"));
        assert!(!is_block("span"));
        assert!(!is_block("a"));
        assert!(!is_block("x-markdown"));
    }

    #[test]
    fn test_is_web_address() {
        assert!(is_web_address("https://forums.example.com"));
        assert!(is_web_address("  HTTP://x"));
        assert!(is_web_address("www.example.com"));
        assert!(!is_web_address("see https://x"));
        assert!(!is_web_address("/relative"));
        assert!(!is_web_address("ww"));
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tx\t", 4), "    x    ");
    }

    #[test]
    fn test_encode_link_target() {
        assert_eq!(
            encode_link_target(" https://x.com/a b_(c) "),
            "https://x.com/a%20b_%28c%29"
        );
    }

    #[test]
    fn test_split_leading_whitespace() {
        assert_eq!(split_leading_whitespace("\t\t item "), ("\t\t ", "item "));
        assert_eq!(split_leading_whitespace("item"), ("", "item"));
    }
}
