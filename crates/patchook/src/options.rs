//! Transcoding options.

use indexmap::IndexMap;
use patchook_core::LineOptions;
use serde::{Deserialize, Serialize};

/// Class names the forum software puts on the elements the normalizer cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Article wrapping the post and its links
    pub article: String,
    /// Post body section
    pub section: String,
    /// Spoiler region
    pub spoiler: String,
    /// Label inside a spoiler region
    pub spoiler_header: String,
    /// Redundant page title heading
    pub page_title: String,
    /// Embed placeholder iframe
    pub embed: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            article: "ipsContained ipsSpacer_top".to_string(),
            section: "ipsType_richText ipsType_normal".to_string(),
            spoiler: "ipsSpoiler".to_string(),
            spoiler_header: "ipsSpoiler_header".to_string(),
            page_title: "ipsType_pageTitle".to_string(),
            embed: "ipsEmbed_finishedLoading".to_string(),
        }
    }
}

/// Options for [`PatchNotesService`](crate::PatchNotesService)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeOptions {
    pub classes: ClassNames,

    /// Spans with a larger pixel font size become headings, the rest subtext
    pub default_font_size: f32,

    /// Spaces per tab inside preformatted blocks
    pub tab_width: usize,

    /// Quote marker for spoilers and indented paragraphs
    pub quote_marker: String,

    /// Marker for large text
    pub heading_marker: String,

    /// Marker for small text
    pub subtext_marker: String,

    /// Tag → markdown template, `{}` stands for one line of content
    pub templates: IndexMap<String, String>,

    /// Options of the line-oriented stages
    pub lines: LineOptions,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        let templates = [
            ("strong", "**{}**"),
            ("b", "**{}**"),
            ("i", "*{}*"),
            ("em", "*{}*"),
            ("u", "__{}__"),
            ("s", "~~{}~~"),
            ("strike", "~~{}~~"),
            ("del", "~~{}~~"),
            ("h1", "# {}"),
            ("h2", "## {}"),
            ("h3", "### {}"),
            ("small", "-# {}"),
        ]
        .into_iter()
        .map(|(tag, template)| (tag.to_string(), template.to_string()))
        .collect();

        Self {
            classes: ClassNames::default(),
            default_font_size: 13.0,
            tab_width: 4,
            quote_marker: "> ".to_string(),
            heading_marker: "## ".to_string(),
            subtext_marker: "-# ".to_string(),
            templates,
            lines: LineOptions::default(),
        }
    }
}

impl TranscodeOptions {
    /// The template for a tag, if it has one
    pub fn template(&self, tag: &str) -> Option<&str> {
        self.templates.get(tag).map(String::as_str)
    }

    /// Markers that open a line and stay outside of inline templates
    pub(crate) fn line_markers(&self) -> [&str; 3] {
        [
            self.quote_marker.as_str(),
            self.heading_marker.as_str(),
            self.subtext_marker.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates() {
        let options = TranscodeOptions::default();
        assert_eq!(options.template("b"), Some("**{}**"));
        assert_eq!(options.template("small"), Some("-# {}"));
        assert_eq!(options.template("span"), None);
    }

    #[test]
    fn test_partial_json() {
        let options: TranscodeOptions =
            serde_json::from_str(r#"{"default_font_size": 16, "lines": {"header_threshold": 80}}"#)
                .unwrap();
        assert_eq!(options.default_font_size, 16.0);
        assert_eq!(options.lines.header_threshold, 80);
        assert_eq!(options.lines.fence, "```");
        assert_eq!(options.classes.spoiler, "ipsSpoiler");
    }
}
