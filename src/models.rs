use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of topical tags. Declaration order doubles as the classifier's
/// tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "cybersecurity")]
    Cybersecurity,
    #[serde(alias = "tech")]
    Tech,
    #[serde(rename = "Sports News", alias = "sports")]
    Sports,
    #[serde(rename = "Business / Economic News", alias = "business")]
    Business,
    #[serde(rename = "Political News", alias = "politics")]
    Politics,
    #[serde(rename = "Science & Technology News", alias = "science")]
    Science,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cybersecurity,
        Category::Tech,
        Category::Sports,
        Category::Business,
        Category::Politics,
        Category::Science,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Cybersecurity => "Cybersecurity",
            Category::Tech => "Tech",
            Category::Sports => "Sports News",
            Category::Business => "Business / Economic News",
            Category::Politics => "Political News",
            Category::Science => "Science & Technology News",
        }
    }

    /// URL path segment used by the site for this category.
    pub fn path(&self) -> &'static str {
        match self {
            Category::Cybersecurity => "cybersecurity",
            Category::Tech => "tech",
            Category::Sports => "sports",
            Category::Business => "business",
            Category::Politics => "politics",
            Category::Science => "science",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.path().eq_ignore_ascii_case(path.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A configured feed endpoint and the category its items fall back to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeedSource {
    pub url: String,
    pub category: Category,
}

impl FeedSource {
    pub fn new(url: &str, category: Category) -> Self {
        Self {
            url: url.to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRef {
    pub url: String,
    pub mime: Option<String>,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, mime: Option<&str>) -> Self {
        Self {
            url: url.into(),
            mime: mime.map(str::to_string),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().starts_with("image/"))
    }

    /// True when the declared type rules out an image (audio or video).
    pub fn is_non_image(&self) -> bool {
        self.mime.as_deref().is_some_and(|m| {
            let m = m.to_ascii_lowercase();
            m.starts_with("audio/") || m.starts_with("video/")
        })
    }
}

/// One feed entry, flattened into the handful of fields the pipeline reads.
#[derive(Debug, Clone, Default)]
pub struct RawFeedItem {
    pub id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub links: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>, // RSS description / Atom summary, may hold HTML
    pub content: Option<String>, // content:encoded / Atom content
    pub creator: Option<String>,
    pub enclosure: Option<MediaRef>,
    pub media_content: Vec<MediaRef>,
    pub media_group: Vec<MediaRef>,
}

impl RawFeedItem {
    /// Every string-valued field an image URL could hide in. This is the
    /// fixed list the last-resort heuristic scan walks.
    pub fn string_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str())
            .chain(self.link.as_deref())
            .chain(self.links.iter().map(String::as_str))
            .chain(self.summary.as_deref())
            .chain(self.content.as_deref())
            .chain(self.enclosure.iter().map(|e| e.url.as_str()))
            .chain(self.media_content.iter().map(|m| m.url.as_str()))
            .chain(self.media_group.iter().map(|m| m.url.as_str()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostContent {
    pub summary: String,
    pub impact: String,
    pub takeaways: Vec<String>,
}

/// The persisted entity. Field order here is the field order on disk.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub image: Option<String>,
    pub content: PostContent,
    pub link: String,
    pub author: String,
}

impl Post {
    pub fn canonical_path(&self) -> String {
        format!("/{}/{}", self.category.path(), self.slug)
    }
}

impl AsRef<Post> for Post {
    fn as_ref(&self) -> &Post {
        self
    }
}
