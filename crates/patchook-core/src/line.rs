//! Line records: the units of the flattened text stream.

use serde::{Deserialize, Serialize};

/// Options shared by the line-oriented stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    /// Marker prepended once per list nesting level to the first text of a list item
    pub indent_marker: String,
    /// Code fence delimiter
    pub fence: String,
    /// Lines shorter than this count as headers, longer ones as paragraphs
    pub header_threshold: usize,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            indent_marker: "\t\t".to_string(),
            fence: "```".to_string(),
            header_threshold: 64,
        }
    }
}

/// One raw line of flattened text with the structure decoded from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// The line as it appears in the flattened text, newline included
    pub raw: &'a str,
    /// List nesting depth, 0 when the line is not a list item
    pub indentation: usize,
    /// Whether the line opens or closes a fenced code block
    pub is_block_delimiter: bool,
}

impl<'a> LineRecord<'a> {
    /// Decode a raw line.
    pub fn parse(raw: &'a str, options: &LineOptions) -> Self {
        Self {
            raw,
            indentation: indentation_of(raw, &options.indent_marker),
            is_block_delimiter: !options.fence.is_empty()
                && raw.trim_end_matches('\n').starts_with(options.fence.as_str()),
        }
    }

    /// Whether the raw line carried a newline.
    pub fn has_newline(&self) -> bool {
        self.raw.ends_with('\n')
    }

    /// The line without indentation markers or surrounding whitespace.
    ///
    /// A single trailing newline is kept when the raw line had one, so a blank line
    /// becomes `"\n"` and a blank final line becomes empty.
    pub fn stripped(&self, options: &LineOptions) -> String {
        let mut content = self.raw.trim_start_matches(' ');
        if !options.indent_marker.is_empty() {
            for _ in 0..self.indentation {
                content = content
                    .strip_prefix(options.indent_marker.as_str())
                    .unwrap_or(content);
            }
        }

        let mut stripped = content.trim().to_string();
        if self.has_newline() {
            stripped.push('\n');
        }
        stripped
    }
}

/// Count the leading indentation markers of a line.
///
/// Leading spaces are skipped; markers anywhere else in the line do not count.
pub fn indentation_of(line: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }

    let mut rest = line.trim_start_matches(' ');
    let mut depth = 0;
    while let Some(next) = rest.strip_prefix(marker) {
        depth += 1;
        rest = next;
    }
    depth
}

/// Bullet prefix for a list item at the given depth.
pub fn list_prefix(depth: usize) -> String {
    if depth == 0 {
        return String::new();
    }
    format!("{}- ", "  ".repeat(depth - 1))
}

/// Length in characters, the unit the chat API counts in.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_of() {
        assert_eq!(indentation_of("plain", "\t\t"), 0);
        assert_eq!(indentation_of("\t\titem", "\t\t"), 1);
        assert_eq!(indentation_of("  \t\t\t\tsub", "\t\t"), 2);
        assert_eq!(indentation_of("\titem", "\t\t"), 0);
        assert_eq!(indentation_of("text\t\tmore", "\t\t"), 0);
    }

    #[test]
    fn test_list_prefix() {
        assert_eq!(list_prefix(0), "");
        assert_eq!(list_prefix(1), "- ");
        assert_eq!(list_prefix(3), "    - ");
    }

    #[test]
    fn test_stripped_keeps_newline() {
        let options = LineOptions::default();
        let record = LineRecord::parse("\t\t  Fixed a crash  \n", &options);
        assert_eq!(record.indentation, 1);
        assert_eq!(record.stripped(&options), "Fixed a crash\n");

        let blank = LineRecord::parse("   \n", &options);
        assert_eq!(blank.stripped(&options), "\n");

        let last = LineRecord::parse("   ", &options);
        assert_eq!(last.stripped(&options), "");
    }

    #[test]
    fn test_visible_marker_is_removed() {
        let options = LineOptions {
            indent_marker: "»".to_string(),
            ..LineOptions::default()
        };
        let record = LineRecord::parse("»»nested\n", &options);
        assert_eq!(record.indentation, 2);
        assert_eq!(record.stripped(&options), "nested\n");
    }

    #[test]
    fn test_block_delimiter() {
        let options = LineOptions::default();
        assert!(LineRecord::parse("```\n", &options).is_block_delimiter);
        assert!(LineRecord::parse("```lua", &options).is_block_delimiter);
        assert!(!LineRecord::parse(" ```\n", &options).is_block_delimiter);
    }

    #[test]
    fn test_char_len_counts_scalars() {
        assert_eq!(char_len("héllo"), 5);
    }
}
