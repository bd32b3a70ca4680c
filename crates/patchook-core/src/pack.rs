//! Payload Packer: distributes finished lines into a description and fields.

use tracing::debug;

use crate::limits::Limits;
use crate::line::char_len;
use crate::patch::PatchInfo;
use crate::payload::{Field, Footer, Image, Payload};

/// Description and fields produced from a line sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedContent {
    pub description: String,
    pub fields: Vec<Field>,
    /// Whether any content was cut off
    pub truncated: bool,
}

/// Packs lines under the limits, in order, never reordering them.
#[derive(Debug)]
pub struct Packer<'l> {
    limits: &'l Limits,
    content: PackedContent,
    total: usize,
}

impl<'l> Packer<'l> {
    pub fn new(limits: &'l Limits) -> Self {
        Self {
            limits,
            content: PackedContent::default(),
            total: 0,
        }
    }

    /// Pack every line, stopping at the first one that no longer fits.
    pub fn pack<S: AsRef<str>>(mut self, lines: &[S]) -> PackedContent {
        for line in lines {
            if !self.push(line.as_ref()) {
                break;
            }
        }
        self.content
    }

    /// Place one line. Returns `false` once capacity is exhausted.
    fn push(&mut self, line: &str) -> bool {
        let limits = self.limits;
        let len = char_len(line);

        if self.total + len > limits.content_budget() {
            debug!(total = self.total, len, "content budget exhausted");
            self.truncate("");
            return false;
        }

        if self.content.fields.is_empty()
            && char_len(&self.content.description) + len < limits.description
        {
            self.content.description.push_str(line);
            self.total += len;
            return true;
        }

        if let Some(name) = header_name(line) {
            if self.content.fields.len() < limits.max_fields {
                let name = clip(name, limits.field_name, &limits.ellipsis);
                self.total += char_len(&name);
                self.content.fields.push(Field::named(name));
                return true;
            }
        }

        let needs_field = match self.content.fields.last() {
            Some(field) => char_len(&field.value) + len > limits.field_value,
            None => true,
        };
        if needs_field {
            if self.content.fields.len() >= limits.max_fields || len > limits.field_value {
                debug!(
                    fields = self.content.fields.len(),
                    len, "no room for line, truncating"
                );
                self.truncate(line);
                return false;
            }
            self.content.fields.push(Field::default());
        }

        if let Some(field) = self.content.fields.last_mut() {
            field.value.push_str(line);
            self.total += len;
        }
        true
    }

    /// Close the last written region with the ellipsis, topping it up with as much of
    /// `overflow` as its cap and the remaining budget allow.
    fn truncate(&mut self, overflow: &str) {
        let limits = self.limits;
        let remaining = limits.content_budget().saturating_sub(self.total);
        let (region, cap) = match self.content.fields.last_mut() {
            Some(field) => (&mut field.value, limits.field_value),
            None => (&mut self.content.description, limits.description),
        };

        let ellipsis_len = char_len(&limits.ellipsis);
        let before = char_len(region);
        let take = cap
            .saturating_sub(before)
            .min(remaining)
            .saturating_sub(ellipsis_len);
        region.extend(overflow.chars().take(take));

        let keep = cap.saturating_sub(ellipsis_len);
        if char_len(region) > keep {
            *region = region.chars().take(keep).collect();
        }
        region.push_str(&limits.ellipsis);

        self.total = self.total + char_len(region) - before;
        self.content.truncated = true;
    }
}

/// Pack finished lines and patch metadata into a payload.
pub fn pack<S: AsRef<str>>(lines: &[S], patch: &PatchInfo, limits: &Limits) -> Payload {
    let content = Packer::new(limits).pack(lines);

    Payload {
        title: patch.title(),
        url: patch.url.clone(),
        timestamp: patch.timestamp.clone(),
        color: patch.color(),
        author: patch.author.clone(),
        description: content.description,
        fields: content.fields,
        footer: Footer {
            text: patch.footer_text().to_string(),
        },
        image: patch
            .thumbnail_url
            .as_ref()
            .filter(|url| !url.is_empty())
            .map(|url| Image { url: url.clone() }),
    }
}

/// The text of a bold header line (`**Header**`), if the line is a single bold run.
fn header_name(line: &str) -> Option<&str> {
    let name = line.trim().strip_prefix("**")?.strip_suffix("**")?;
    if name.is_empty() || name.contains("**") {
        return None;
    }
    Some(name)
}

fn clip(text: &str, cap: usize, ellipsis: &str) -> String {
    if char_len(text) <= cap {
        return text.to_string();
    }
    let mut clipped: String = text
        .chars()
        .take(cap.saturating_sub(char_len(ellipsis)))
        .collect();
    clipped.push_str(ellipsis);
    clipped
}
