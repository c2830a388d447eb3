use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::{Entry, Link, MediaObject};
use feed_rs::parser;
use log::{debug, info, warn};
use reqwest::Client;

use crate::error::FetchError;
use crate::models::{FeedSource, MediaRef, RawFeedItem};

/// The network seam: a plain GET returning the body of a 2xx response.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::request(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Items pulled from one source, still carrying the source they came from.
#[derive(Debug, Clone)]
pub struct SourceItems {
    pub source: FeedSource,
    pub items: Vec<RawFeedItem>,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub batches: Vec<SourceItems>,
    pub failed: Vec<(FeedSource, FetchError)>,
}

pub struct FeedFetcher<'a, H: HttpFetch> {
    http: &'a H,
    timeout: Duration,
}

impl<'a, H: HttpFetch> FeedFetcher<'a, H> {
    pub fn new(http: &'a H, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>, FetchError> {
        let bytes = self.http.get(&source.url, self.timeout).await?;
        parse_items(&source.url, &bytes)
    }

    /// Fetch every source in turn. A source that fails is logged and
    /// recorded; it never stops the others.
    pub async fn fetch_all(&self, sources: &[FeedSource]) -> FetchReport {
        let mut report = FetchReport::default();

        for source in sources {
            info!("Fetching {}...", source.url);
            match self.fetch(source).await {
                Ok(items) => {
                    info!("Fetched {} items from {}", items.len(), source.url);
                    report.batches.push(SourceItems {
                        source: source.clone(),
                        items,
                    });
                }
                Err(e) => {
                    warn!("Error fetching {}: {}", source.url, e);
                    report.failed.push((source.clone(), e));
                }
            }
        }

        report
    }
}

pub fn parse_items(url: &str, bytes: &[u8]) -> Result<Vec<RawFeedItem>, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    debug!("Parsed {} entries from {}", feed.entries.len(), url);
    Ok(feed.entries.into_iter().map(RawFeedItem::from).collect())
}

fn select_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| {
            let rel = l.rel.as_deref().unwrap_or("");
            !l.href.trim().is_empty() && (rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| links.iter().find(|l| !l.href.trim().is_empty()))
        .map(|l| l.href.trim().to_string())
}

fn media_refs(object: &MediaObject) -> impl Iterator<Item = MediaRef> + '_ {
    object.content.iter().filter_map(|content| {
        let url = content.url.as_ref()?;
        let mime = content.content_type.as_ref().map(|m| m.essence_str());
        Some(MediaRef::new(url.as_str(), mime))
    })
}

fn thumbnails(object: &MediaObject) -> impl Iterator<Item = MediaRef> + '_ {
    object
        .thumbnails
        .iter()
        .map(|t| MediaRef::new(t.image.uri.as_str(), None))
}

impl From<Entry> for RawFeedItem {
    fn from(entry: Entry) -> Self {
        let link = select_link(&entry.links);
        let links = entry.links.iter().map(|l| l.href.clone()).collect();

        // feed-rs pushes each <media:group> as it is parsed and appends the
        // item-level object (<enclosure>, bare <media:content>) last.
        let (media_content, mut media_group) = match entry.media.split_last() {
            Some((item_level, groups)) => (
                media_refs(item_level).collect::<Vec<_>>(),
                groups.iter().flat_map(|o| media_refs(o)).collect::<Vec<_>>(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        media_group.extend(entry.media.iter().flat_map(thumbnails));

        let enclosure = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("enclosure")))
            .map(|l| MediaRef::new(l.href.as_str(), l.media_type.as_deref()))
            .or_else(|| media_content.iter().find(|m| m.mime.is_some()).cloned());

        RawFeedItem {
            id: entry.id,
            title: entry.title.map(|t| t.content),
            link,
            links,
            published: entry.published.or(entry.updated),
            summary: entry.summary.map(|s| s.content),
            content: entry.content.and_then(|c| c.body),
            creator: entry.authors.into_iter().map(|p| p.name).find(|n| !n.trim().is_empty()),
            enclosure,
            media_content,
            media_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Example feed</description>
    <item>
      <title>First Story</title>
      <link>https://example.com/first</link>
      <guid>https://example.com/first</guid>
      <pubDate>Wed, 01 May 2024 10:00:00 GMT</pubDate>
      <description>&lt;p&gt;Hello there&lt;/p&gt;</description>
      <enclosure url="https://example.com/first.jpg" type="image/jpeg" length="1234"/>
    </item>
    <item>
      <title>Second Story</title>
      <link>https://example.com/second</link>
      <description>No media here</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_items("https://example.com/feed", RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("First Story"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/first"));
        assert_eq!(
            first.published.map(|d| d.to_rfc3339()),
            Some("2024-05-01T10:00:00+00:00".to_string())
        );
        assert!(first.summary.as_deref().unwrap().contains("Hello there"));
        let enclosure = first.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url, "https://example.com/first.jpg");
        assert!(enclosure.is_image());

        let second = &items[1];
        assert!(second.enclosure.is_none());
        assert!(second.media_content.is_empty());
    }

    #[test]
    fn test_bare_media_content_is_item_level_after_group() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Example</title>
    <link>https://a.com</link>
    <description>Example feed</description>
    <item>
      <title>Grouped</title>
      <link>https://a.com/grouped</link>
      <media:group>
        <media:content url="https://a.com/group.jpg" medium="image"/>
      </media:group>
      <media:content url="https://a.com/item.jpg" medium="image"/>
    </item>
  </channel>
</rss>"#;
        let items = parse_items("https://a.com/feed", rss.as_bytes()).unwrap();
        let item = &items[0];

        let content: Vec<&str> = item.media_content.iter().map(|m| m.url.as_str()).collect();
        let group: Vec<&str> = item.media_group.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(content, vec!["https://a.com/item.jpg"]);
        assert_eq!(group, vec!["https://a.com/group.jpg"]);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        let err = parse_items("https://bad.example", b"<html>not a feed</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert!(err.to_string().contains("https://bad.example"));
    }

    #[test]
    fn test_parse_atom_enclosure_and_author() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Example</title>
  <id>urn:example:feed</id>
  <updated>2024-05-02T08:00:00Z</updated>
  <entry>
    <title>Atom Entry</title>
    <id>urn:example:entry-1</id>
    <updated>2024-05-02T08:00:00Z</updated>
    <link rel="enclosure" type="image/png" href="https://a.com/pic.png"/>
    <link rel="alternate" href="https://a.com/story"/>
    <author><name>Ada</name></author>
    <summary>Short summary</summary>
  </entry>
</feed>"#;
        let items = parse_items("https://a.com/atom", atom.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);

        let entry = &items[0];
        assert_eq!(entry.link.as_deref(), Some("https://a.com/story"));
        assert_eq!(entry.creator.as_deref(), Some("Ada"));
        assert!(entry.published.is_some());
        let enclosure = entry.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url, "https://a.com/pic.png");
        assert!(enclosure.is_image());
        assert_eq!(entry.links.len(), 2);
    }
}
