use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Category, Post, PostContent, RawFeedItem};
use crate::slug::slugify;

pub const SUMMARY_MAX_CHARS: usize = 1000;
pub const DESCRIPTION_MAX_CHARS: usize = 160;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup from a feed field and collapse it to a single line.
pub fn plain_text(html: &str) -> String {
    let without_tags = RE_TAG.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    RE_WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// First `max` chars of `text`, never splitting a code point.
fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let head = take_chars(text, max);
    if head.len() < text.len() {
        format!("{}...", head.trim_end())
    } else {
        head.to_string()
    }
}

pub fn impact_for(category: Category) -> String {
    format!(
        "This development in {} highlights the evolving landscape of technology. For users in the US, UK, Canada, and Australia, staying informed about these changes is crucial for digital safety and productivity.",
        category.name().to_lowercase()
    )
}

pub fn takeaways_for(category: Category) -> Vec<String> {
    vec![
        format!("Stay updated with the latest {} trends.", category),
        "Ensure your systems are patched and secure.".to_string(),
        "Follow Newsera.blog for more updates.".to_string(),
    ]
}

/// Text of an item in the two shapes the pipeline needs: a short snippet
/// (description) and the longer body (summary, classification).
#[derive(Debug, Clone, Default)]
pub struct ItemText {
    pub snippet: String,
    pub body: String,
}

impl ItemText {
    pub fn from_item(item: &RawFeedItem) -> Self {
        let summary = item.summary.as_deref().map(plain_text).unwrap_or_default();
        let content = item.content.as_deref().map(plain_text).unwrap_or_default();

        let snippet = if summary.is_empty() {
            content.clone()
        } else {
            summary
        };
        let body = if content.is_empty() {
            snippet.clone()
        } else {
            content
        };

        Self { snippet, body }
    }
}

/// Assembles posts from feed items.
pub struct PostBuilder {
    default_author: String,
}

impl PostBuilder {
    pub fn new(default_author: &str) -> Self {
        Self {
            default_author: default_author.to_string(),
        }
    }

    /// Build the post for `item`. Returns `None` when the item has no usable
    /// title (missing, blank, or slugifying to nothing).
    ///
    /// The image is left unset; it is resolved later, only for posts that
    /// make it through the gate.
    pub fn build(
        &self,
        item: &RawFeedItem,
        text: &ItemText,
        category: Category,
        now: DateTime<Utc>,
    ) -> Option<Post> {
        let title = item.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let slug = slugify(title);
        if slug.is_empty() {
            return None;
        }

        let description = if text.snippet.is_empty() {
            title.to_string()
        } else {
            take_chars(&text.snippet, DESCRIPTION_MAX_CHARS).to_string()
        };

        let author = item
            .creator
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.default_author)
            .to_string();

        Some(Post {
            title: title.to_string(),
            slug,
            date: item.published.unwrap_or(now),
            description,
            category,
            image: None,
            content: PostContent {
                summary: truncate_with_ellipsis(&text.body, SUMMARY_MAX_CHARS),
                impact: impact_for(category),
                takeaways: takeaways_for(category),
            },
            link: item.link.clone().unwrap_or_default(),
            author,
        })
    }
}
