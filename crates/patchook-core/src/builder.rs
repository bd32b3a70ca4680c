//! Line Builder: turns flattened text into finished markdown lines.
//!
//! The builder is a small state machine fed one raw line at a time. It decodes list
//! depth, adds bullet prefixes, collapses blank lines, bolds headers that introduce a
//! list, keeps headers next to their descriptions and passes fenced code through
//! untouched.

use tracing::trace;

use crate::line::{char_len, list_prefix, LineOptions, LineRecord};

const SPACER: &str = "\n";

/// Stateful builder producing finished lines.
#[derive(Debug)]
pub struct LineBuilder<'o> {
    options: &'o LineOptions,
    lines: Vec<String>,
    in_code_block: bool,
    just_emitted_blank_line: bool,
    previous_indentation: usize,
    last_text: Option<usize>,
}

impl<'o> LineBuilder<'o> {
    /// Create an empty builder
    pub fn new(options: &'o LineOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
            in_code_block: false,
            just_emitted_blank_line: false,
            previous_indentation: 0,
            last_text: None,
        }
    }

    /// Feed one raw line (including its newline, if any).
    pub fn push(&mut self, raw: &str) {
        let record = LineRecord::parse(raw, self.options);

        if record.is_block_delimiter {
            self.in_code_block = !self.in_code_block;
        }
        if self.in_code_block {
            self.lines.push(raw.to_string());
            return;
        }

        let stripped = record.stripped(self.options);
        if stripped.is_empty() {
            return;
        }
        if stripped == SPACER {
            self.push_spacer();
            return;
        }

        let indentation = record.indentation;
        // Authors sometimes type their own bullets.
        let prefix = if stripped.starts_with("\\*") {
            String::new()
        } else {
            list_prefix(indentation)
        };

        if indentation > 0 && self.previous_indentation == 0 {
            self.promote_header();
        }
        if indentation == 0 && !stripped.starts_with("**") {
            self.attach_description(&stripped);
        }
        if indentation == 0 && self.previous_indentation > 0 && !self.ends_with_spacer() {
            self.lines.push(SPACER.to_string());
        }

        self.lines.push(prefix + &stripped);
        self.just_emitted_blank_line = false;
        self.previous_indentation = indentation;
        self.last_text = Some(self.lines.len() - 1);
    }

    /// Finish building and return the lines.
    pub fn finish(mut self) -> Vec<String> {
        if !self.in_code_block {
            while self.ends_with_spacer() {
                self.lines.pop();
            }
        }
        self.lines
    }

    fn push_spacer(&mut self) {
        if self.just_emitted_blank_line
            || self.lines.is_empty()
            || self.previous_indentation > 0
            || self.ends_with_spacer()
        {
            return;
        }
        self.lines.push(SPACER.to_string());
        self.just_emitted_blank_line = true;
    }

    fn ends_with_spacer(&self) -> bool {
        self.lines.last().is_some_and(|line| line == SPACER)
    }

    fn pop_spacer(&mut self) {
        if self.ends_with_spacer() {
            self.lines.pop();
            self.just_emitted_blank_line = false;
        }
    }

    /// The line right before a list becomes its bold header.
    fn promote_header(&mut self) {
        self.pop_spacer();

        let Some(index) = self.last_text else {
            return;
        };
        if index + 1 != self.lines.len() {
            return;
        }

        let header = self.lines[index].trim();
        if is_bold(header)
            || (!self.options.fence.is_empty() && header.starts_with(self.options.fence.as_str()))
            || is_block_markup(header)
            || char_len(header) >= self.options.header_threshold
        {
            return;
        }

        trace!(header, "promoting list header");
        self.lines[index] = format!("**{header}**\n");
    }

    /// A long paragraph directly after a short bold header hugs it.
    fn attach_description(&mut self, stripped: &str) {
        let Some(index) = self.last_text else {
            return;
        };
        if !self.ends_with_spacer() || index + 2 != self.lines.len() {
            return;
        }

        let header = self.lines[index].trim();
        let threshold = self.options.header_threshold;
        if is_bold(header)
            && char_len(header) < threshold
            && char_len(stripped.trim()) >= threshold
        {
            self.pop_spacer();
        }
    }
}

/// Build finished lines from flattened text.
pub fn build_lines(text: &str, options: &LineOptions) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    let mut builder = LineBuilder::new(options);
    for raw in text.split_inclusive('\n') {
        builder.push(raw);
    }
    builder.finish()
}

fn is_bold(line: &str) -> bool {
    line.len() >= 4 && line.starts_with("**") && line.ends_with("**")
}

/// Headings, subtext and quotes carry their own markup and are never bolded.
fn is_block_markup(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("-#") || line.starts_with('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(text: &str) -> Vec<String> {
        build_lines(text, &LineOptions::default())
    }

    #[test]
    fn test_nested_list_under_header() {
        let lines = build("Heading\n\t\titem1\n\t\t\t\tsubitem\n");
        assert_eq!(lines, vec!["**Heading**\n", "- item1\n", "  - subitem\n"]);
    }

    #[test]
    fn test_spacer_between_header_and_list_is_removed() {
        let lines = build("Heading\n \n\t\titem\n");
        assert_eq!(lines, vec!["**Heading**\n", "- item\n"]);
    }

    #[test]
    fn test_blank_lines_collapse() {
        let lines = build("\n\nfirst\n\n\n  \nsecond\n\n");
        assert_eq!(lines, vec!["first\n", "\n", "second\n"]);
    }

    #[test]
    fn test_section_break_after_list() {
        let lines = build("Changes\n\t\tone\n\t\ttwo\n\nAfterwards\n");
        assert_eq!(
            lines,
            vec!["**Changes**\n", "- one\n", "- two\n", "\n", "Afterwards\n"]
        );
    }

    #[test]
    fn test_header_already_bold_is_kept() {
        let lines = build("**Bug Fixes**\n\t\tfixed\n");
        assert_eq!(lines, vec!["**Bug Fixes**\n", "- fixed\n"]);
    }

    #[test]
    fn test_italic_header_is_promoted() {
        let lines = build("*Changes*\n\t\tfixed\n");
        assert_eq!(lines, vec!["***Changes***\n", "- fixed\n"]);

        let lines = build("***Changes***\n\t\tfixed\n");
        assert_eq!(lines, vec!["***Changes***\n", "- fixed\n"]);
    }

    #[test]
    fn test_long_line_is_not_promoted() {
        let long = "x".repeat(80);
        let lines = build(&format!("{long}\n\t\titem\n"));
        assert_eq!(lines[0], format!("{long}\n"));
    }

    #[test]
    fn test_heading_line_is_not_promoted() {
        let lines = build("## Changes\n\t\titem\n");
        assert_eq!(lines, vec!["## Changes\n", "- item\n"]);
    }

    #[test]
    fn test_description_hugs_bold_header() {
        let paragraph = "This update brings a long list of changes to the way things work.";
        let lines = build(&format!("**New Content**\n\n{paragraph}\n"));
        assert_eq!(lines, vec!["**New Content**\n".to_string(), format!("{paragraph}\n")]);
    }

    #[test]
    fn test_short_paragraph_keeps_spacer() {
        let lines = build("**New Content**\n\nShort note.\n");
        assert_eq!(lines, vec!["**New Content**\n", "\n", "Short note.\n"]);
    }

    #[test]
    fn test_manual_bullets_get_no_prefix() {
        let lines = build("Notes\n\t\t\\* already bulleted\n");
        assert_eq!(lines, vec!["**Notes**\n", "\\* already bulleted\n"]);
    }

    #[test]
    fn test_code_block_passthrough() {
        let lines = build("Run this:\n```\n  local x = 1\n\n\t\tnot_a_list()\n```\nDone\n");
        assert_eq!(
            lines,
            vec![
                "Run this:\n",
                "```\n",
                "  local x = 1\n",
                "\n",
                "\t\tnot_a_list()\n",
                "```\n",
                "Done\n"
            ]
        );
    }

    #[test]
    fn test_code_fence_is_not_promoted() {
        let lines = build("```\ncode\n```\n\t\titem\n");
        assert_eq!(lines, vec!["```\n", "code\n", "```\n", "- item\n"]);
    }

    #[test]
    fn test_no_spacer_after_list() {
        let lines = build("Changes\n\t\tone\n\n\n\t\ttwo\n");
        assert_eq!(lines, vec!["**Changes**\n", "- one\n", "- two\n"]);
    }

    #[test]
    fn test_list_without_header() {
        let lines = build("\t\tonly item\n");
        assert_eq!(lines, vec!["- only item\n"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build("").is_empty());
        assert!(build("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_final_line_without_newline() {
        let lines = build("first\nlast");
        assert_eq!(lines, vec!["first\n", "last"]);
    }
}
