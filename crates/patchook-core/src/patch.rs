//! Externally supplied metadata about a game-update post.

use serde::{Deserialize, Serialize};

const TITLE_PREFIX: &str = "[Game Update] -";
const COLOR_ORANGE: u32 = 15105570;
const COLOR_BLUE: u32 = 3447003;
const BETA_FOOTER: &str = "A beta is available for this version.";
const HOTFIX_FOOTER: &str = "This is a hotfix release.";

/// Post author, shaped like the embed author block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub icon_url: String,
    pub url: String,
}

/// Classification of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchTag {
    Major,
    Hotfix,
    Beta,
    Release,
}

impl PatchTag {
    /// Tag name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchTag::Major => "major",
            PatchTag::Hotfix => "hotfix",
            PatchTag::Beta => "beta",
            PatchTag::Release => "release",
        }
    }
}

/// Kind of auxiliary link shown alongside the notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Trailer,
    Discussion,
    Reward,
}

impl LinkKind {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Trailer => "Watch Trailer",
            LinkKind::Discussion => "Join Discussion",
            LinkKind::Reward => "Klei Points/Spools",
        }
    }
}

/// An auxiliary link (trailer, discussion thread, reward link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxLink {
    pub kind: LinkKind,
    pub url: String,
    /// Custom emoji token such as `<:name:id>`
    #[serde(default)]
    pub icon: Option<String>,
}

impl AuxLink {
    pub fn new(kind: LinkKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Everything about a patch that does not come from the post body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchInfo {
    pub version: u64,
    pub url: String,
    pub hotfix: bool,
    pub beta: bool,
    pub author: Author,
    /// ISO-8601 publish time
    pub timestamp: String,
    pub links: Vec<AuxLink>,
    pub thumbnail_url: Option<String>,
}

impl PatchInfo {
    pub fn is_major(&self) -> bool {
        !self.hotfix
    }

    pub fn is_release(&self) -> bool {
        !self.beta
    }

    pub fn has_trailer(&self) -> bool {
        self.links
            .iter()
            .any(|link| link.kind == LinkKind::Trailer && !link.url.is_empty())
    }

    /// Every tag that applies to this patch
    pub fn tags(&self) -> Vec<PatchTag> {
        let mut tags = Vec::with_capacity(2);
        if self.is_major() {
            tags.push(PatchTag::Major);
        }
        if self.hotfix {
            tags.push(PatchTag::Hotfix);
        }
        if self.beta {
            tags.push(PatchTag::Beta);
        }
        if self.is_release() {
            tags.push(PatchTag::Release);
        }
        tags
    }

    /// Embed title, e.g. `[Game Update] - 600267 (Release)`
    pub fn title(&self) -> String {
        let tag = if self.beta {
            "(Beta)"
        } else if self.is_major() {
            "(Release)"
        } else {
            ""
        };
        format!("{} {} {}", TITLE_PREFIX, self.version, tag)
            .trim_end()
            .to_string()
    }

    pub fn color(&self) -> u32 {
        if self.beta {
            COLOR_BLUE
        } else {
            COLOR_ORANGE
        }
    }

    /// Footer text; empty for a full release
    pub fn footer_text(&self) -> &'static str {
        if self.beta {
            BETA_FOOTER
        } else if self.hotfix {
            HOTFIX_FOOTER
        } else {
            ""
        }
    }
}

/// Markdown section listing the auxiliary links, empty when there are none.
pub fn links_header(links: &[AuxLink]) -> String {
    if links.is_empty() {
        return String::new();
    }

    let mut header = String::from("# Links\n");
    for link in links {
        header.push_str(&format!(
            "### {} [{}]({})\n",
            link.icon.as_deref().unwrap_or("-"),
            link.label(),
            link.url
        ));
    }
    header
}

/// Give scheme-relative URLs (`//host/path`) an `https` scheme.
pub fn with_default_scheme(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(hotfix: bool, beta: bool) -> PatchInfo {
        PatchInfo {
            version: 600267,
            hotfix,
            beta,
            ..PatchInfo::default()
        }
    }

    #[test]
    fn test_title() {
        assert_eq!(patch(false, false).title(), "[Game Update] - 600267 (Release)");
        assert_eq!(patch(true, true).title(), "[Game Update] - 600267 (Beta)");
        assert_eq!(patch(true, false).title(), "[Game Update] - 600267");
    }

    #[test]
    fn test_color() {
        assert_eq!(patch(false, true).color(), 3447003);
        assert_eq!(patch(true, false).color(), 15105570);
    }

    #[test]
    fn test_footer_text() {
        assert_eq!(patch(false, false).footer_text(), "");
        assert_eq!(patch(true, false).footer_text(), "This is a hotfix release.");
        assert_eq!(patch(true, true).footer_text(), "A beta is available for this version.");
    }

    #[test]
    fn test_tags() {
        assert_eq!(patch(false, false).tags(), vec![PatchTag::Major, PatchTag::Release]);
        assert_eq!(patch(true, true).tags(), vec![PatchTag::Hotfix, PatchTag::Beta]);
    }

    #[test]
    fn test_links_header() {
        let links = vec![
            AuxLink::new(LinkKind::Trailer, "https://www.youtube.com/watch?v=abc")
                .with_icon(Some("<:yt:123>".to_string())),
            AuxLink::new(LinkKind::Reward, "https://accounts.klei.com/link/X1"),
        ];
        assert_eq!(
            links_header(&links),
            "# Links\n\
             ### <:yt:123> [Watch Trailer](https://www.youtube.com/watch?v=abc)\n\
             ### - [Klei Points/Spools](https://accounts.klei.com/link/X1)\n"
        );
        assert_eq!(links_header(&[]), "");
    }

    #[test]
    fn test_has_trailer() {
        let mut info = patch(false, false);
        assert!(!info.has_trailer());
        info.links.push(AuxLink::new(LinkKind::Trailer, "https://youtu.be/x"));
        assert!(info.has_trailer());
    }

    #[test]
    fn test_with_default_scheme() {
        assert_eq!(with_default_scheme("//cdn.example.com/a.png"), "https://cdn.example.com/a.png");
        assert_eq!(with_default_scheme("http://x.y/z"), "http://x.y/z");
    }
}
