//! Metadata scanners for update pages.
//!
//! Everything here is a pure function over an already fetched page: the links shown next to
//! the notes, the author block, the thumbnail and the entries of the updates listing. Fetching
//! pages and asking the video service about a trailer is left to the caller.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use patchook_core::{with_default_scheme, Author, AuxLink, LinkKind, PatchInfo};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LinkIcons;
use crate::node::{Element, Node};
use crate::options::ClassNames;
use crate::{PatchookError, Result};

static REWARD_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://accounts\.klei\.com/link/[^"\s/)]+"#).expect("valid reward link pattern")
});

static DISCUSSION_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://forums\.kleientertainment\.com/forums/topic/[^"\s/]+"#)
        .expect("valid discussion link pattern")
});

static YOUTUBE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:https?://)?(?:youtu\.be/|(?:www\.|m\.)?youtube(?:-nocookie)?\.com/(?:watch|v|embed)(?:\.php)?(?:\?\S*?v=|/))([A-Za-z0-9_-]+)",
    )
    .expect("valid video link pattern")
});

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const OEMBED_URL: &str = "https://noembed.com/embed?url=";
const LD_JSON_TYPE: &str = "application/ld+json";

const LISTING_ROW_CLASS: &str = "cCmsRecord_row";
const LISTING_VERSION_CLASS: &str = "ipsType_sectionHead ipsType_break";
const LISTING_BADGE_CLASS: &str = "ipsBadge ipsBadge_negative";

/// Attributes that may hold the address of embedded media
const MEDIA_ATTRIBUTES: &[&str] = &["src", "data-embed-src", "href"];

/// The post body section of an update page.
pub fn post_body<'a>(document: &'a Node, classes: &ClassNames) -> Option<&'a Node> {
    find_node(document, |element| is_post_body(element, classes))
}

pub(crate) fn is_post_body(element: &Element, classes: &ClassNames) -> bool {
    element.tag == "section" && element.has_class(&classes.section)
}

/// The article wrapping the post, or the whole document when there is none.
pub fn post_article<'a>(document: &'a Node, classes: &ClassNames) -> &'a Node {
    find_node(document, |element| {
        element.tag == "article" && element.has_class(&classes.article)
    })
    .unwrap_or(document)
}

fn find_node<F>(root: &Node, predicate: F) -> Option<&Node>
where
    F: Fn(&Element) -> bool,
{
    if root.as_element().is_some_and(&predicate) {
        return Some(root);
    }
    root.descendants()
        .find(|node| node.as_element().is_some_and(&predicate))
}

/// The video id of a YouTube address, if it is one.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    YOUTUBE_LINK
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// The canonical watch page of a video
pub fn youtube_watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}{video_id}")
}

/// The largest thumbnail of a video
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Where to ask about a video's title and channel
pub fn oembed_url(watch_url: &str) -> String {
    format!("{OEMBED_URL}{watch_url}")
}

/// Reward links mentioned anywhere in the page text, in order and without repeats.
pub fn reward_links(document: &Node) -> Vec<String> {
    let text = document.text_content();
    let links: IndexSet<&str> = REWARD_LINK.find_iter(&text).map(|m| m.as_str()).collect();
    links.into_iter().map(str::to_string).collect()
}

/// The last link to a forum discussion thread.
pub fn discussion_url(scope: &Node) -> Option<String> {
    scope
        .descendants()
        .filter_map(Node::as_element)
        .filter(|element| element.tag == "a")
        .filter_map(|element| element.attr("href"))
        .filter(|href| DISCUSSION_LINK.is_match(href))
        .last()
        .map(str::to_string)
}

/// The first video referenced by any element of the page.
pub fn trailer_video_id(document: &Node) -> Option<String> {
    document
        .descendants()
        .filter_map(Node::as_element)
        .flat_map(|element| {
            MEDIA_ATTRIBUTES
                .iter()
                .filter_map(move |name| element.attr(name))
        })
        .find_map(youtube_video_id)
        .map(str::to_string)
}

/// Source of the first image, with an `https` scheme when it had none.
pub fn first_image_url(scope: &Node) -> Option<String> {
    scope
        .find(|element| element.tag == "img")
        .and_then(|img| img.attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(with_default_scheme)
}

/// Sources of the embed placeholders that need resolving before normalization.
///
/// Video embeds are left out, they are rewritten without a lookup.
pub fn embed_sources(document: &Node, classes: &ClassNames) -> Vec<String> {
    let sources: IndexSet<&str> = document
        .descendants()
        .filter_map(Node::as_element)
        .filter(|element| element.tag == "iframe" && element.has_class(&classes.embed))
        .filter_map(|element| {
            ["src", "data-embed-src"]
                .iter()
                .filter_map(|name| element.attr(name))
                .map(str::trim)
                .find(|src| !src.is_empty())
        })
        .filter(|src| youtube_video_id(src).is_none())
        .collect();
    sources.into_iter().map(str::to_string).collect()
}

/// Author as published in the structured data block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LdAuthor {
    pub name: String,
    pub image: String,
    pub url: String,
}

/// The structured data block (`application/ld+json`) of an update page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LdJson {
    pub author: LdAuthor,
    #[serde(rename = "datePublished")]
    pub date_published: String,
}

impl LdJson {
    /// Parse the structured data block of `document`.
    pub fn from_document(document: &Node) -> Result<Self> {
        let script = document
            .find(|element| {
                element.tag == "script"
                    && element
                        .attr("type")
                        .is_some_and(|kind| kind.eq_ignore_ascii_case(LD_JSON_TYPE))
            })
            .ok_or_else(|| PatchookError::MissingNode(format!("{LD_JSON_TYPE} script")))?;

        Self::parse(&script.text_content())
    }

    pub fn parse(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(PatchookError::InvalidInput(format!(
                "empty {LD_JSON_TYPE} script"
            )));
        }
        Ok(serde_json::from_str(json)?)
    }

    /// The author block of the payload
    pub fn author(&self) -> Author {
        Author {
            name: self.author.name.clone(),
            icon_url: with_default_scheme(&self.author.image),
            url: with_default_scheme(&self.author.url),
        }
    }
}

/// Title and channel of a video, as answered by the oEmbed endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    pub title: String,
    pub author_url: String,
}

/// Which videos count as the update's trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailerPolicy {
    /// Channel the video must be published on
    pub channel_url: String,
    /// Text the video title must contain, compared case-insensitively
    pub title_keyword: String,
}

impl Default for TrailerPolicy {
    fn default() -> Self {
        Self {
            channel_url: "https://www.youtube.com/@kleient".to_string(),
            title_keyword: "don't starve".to_string(),
        }
    }
}

impl TrailerPolicy {
    pub fn accepts(&self, video: &VideoInfo) -> bool {
        video.author_url == self.channel_url
            && video
                .title
                .to_lowercase()
                .contains(&self.title_keyword.to_lowercase())
    }
}

/// Everything an update page says about itself besides the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub author: Author,
    pub timestamp: String,
    pub video_id: Option<String>,
    /// Whether the video is shown as a trailer link; it still provides the thumbnail
    pub show_trailer: bool,
    pub discussion_url: Option<String>,
    pub reward_links: Vec<String>,
    pub first_image_url: Option<String>,
}

impl PageMetadata {
    /// Scan an update page.
    ///
    /// Fails only when the structured data block is missing or malformed; every other
    /// piece is optional.
    pub fn scan(document: &Node, classes: &ClassNames) -> Result<Self> {
        let ld_json = LdJson::from_document(document)?;
        let article = post_article(document, classes);
        let video_id = trailer_video_id(document);

        let discussion_url = discussion_url(article);
        if discussion_url.is_none() {
            debug!("no discussion thread linked");
        }

        Ok(Self {
            author: ld_json.author(),
            timestamp: ld_json.date_published,
            show_trailer: video_id.is_some(),
            video_id,
            discussion_url,
            reward_links: reward_links(document),
            first_image_url: first_image_url(article),
        })
    }

    /// Keep the video as thumbnail only when it fails `policy`.
    pub fn check_trailer(&mut self, video: &VideoInfo, policy: &TrailerPolicy) {
        if self.show_trailer && !policy.accepts(video) {
            debug!(video = ?self.video_id, "video is not the update trailer");
            self.show_trailer = false;
        }
    }

    /// Auxiliary links in display order: trailer, discussion, rewards.
    pub fn links(&self, icons: &LinkIcons) -> Vec<AuxLink> {
        let trailer = self
            .video_id
            .as_deref()
            .filter(|_| self.show_trailer)
            .map(|id| (LinkKind::Trailer, youtube_watch_url(id)));
        let discussion = self
            .discussion_url
            .clone()
            .map(|url| (LinkKind::Discussion, url));
        let rewards = self
            .reward_links
            .iter()
            .map(|url| (LinkKind::Reward, url.clone()));

        trailer
            .into_iter()
            .chain(discussion)
            .chain(rewards)
            .map(|(kind, url)| AuxLink::new(kind, url).with_icon(icons.icon_for(kind)))
            .collect()
    }

    /// The thumbnail: the video's when there is one, else the first image
    pub fn thumbnail_url(&self) -> Option<String> {
        self.video_id
            .as_deref()
            .map(youtube_thumbnail_url)
            .or_else(|| self.first_image_url.clone())
    }

    /// Combine with the listing entry into the metadata the packer needs.
    pub fn patch_info(&self, listing: &PatchListing, icons: &LinkIcons) -> PatchInfo {
        PatchInfo {
            version: listing.version,
            url: listing.url.clone(),
            hotfix: listing.hotfix,
            beta: listing.beta,
            author: self.author.clone(),
            timestamp: self.timestamp.clone(),
            links: self.links(icons),
            thumbnail_url: self.thumbnail_url(),
        }
    }
}

/// One row of the game updates listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchListing {
    pub version: u64,
    pub url: String,
    pub hotfix: bool,
    pub beta: bool,
}

impl PatchListing {
    /// The last path segment of the update URL
    pub fn id(&self) -> &str {
        self.url
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Read the rows of the updates listing, in page order (newest first).
///
/// Rows without a readable version number are skipped.
pub fn scan_listing(document: &Node) -> Vec<PatchListing> {
    document
        .descendants()
        .filter(|node| node.tag_name() == "li" && node.has_class(LISTING_ROW_CLASS))
        .filter_map(listing_row)
        .collect()
}

fn listing_row(row: &Node) -> Option<PatchListing> {
    let heading =
        row.find(|element| element.tag == "h3" && element.has_class(LISTING_VERSION_CLASS));
    let Some(heading) = heading else {
        warn!("listing row without a version heading");
        return None;
    };

    let text = heading.text_content();
    let version = match text.trim().parse() {
        Ok(version) => version,
        Err(_) => {
            warn!(version = text.trim(), "unreadable version in listing");
            return None;
        }
    };

    let hotfix = row
        .find(|element| element.tag == "span")
        .and_then(|span| span.attr("title"))
        .is_some_and(|title| title.to_lowercase().contains("hotfix"));
    let beta = row
        .find(|element| element.tag == "span" && element.has_class(LISTING_BADGE_CLASS))
        .is_some_and(|badge| badge.text_content().to_lowercase().contains("test"));
    let url = row
        .find(|element| element.tag == "a")
        .and_then(|a| a.attr("href"))
        .unwrap_or_default()
        .to_string();

    Some(PatchListing {
        version,
        url,
        hotfix,
        beta,
    })
}

/// Entries newer than `target`, in listing order.
///
/// The listing mixes hotfixes into the major releases; the first hotfix that is not newer
/// than `target` ends the scan.
pub fn newer_than(listings: &[PatchListing], target: u64) -> Vec<PatchListing> {
    let mut newer = Vec::new();
    for listing in listings {
        if listing.version > target {
            newer.push(listing.clone());
        } else if listing.hotfix {
            break;
        }
    }
    newer
}

/// The highest version in the listing
pub fn newest_version(listings: &[PatchListing]) -> Option<u64> {
    listings.iter().map(|listing| listing.version).max()
}
