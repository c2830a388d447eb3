//! Finding a representative image for a feed item.
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. an enclosure declared as `image/*`
//! 2. the first `media:content` entry
//! 3. the first entry of any further media group (or a thumbnail)
//! 4. any item field whose whole value looks like an image URL
//! 5. the first `<img src>` inside the item's HTML
//! 6. the article page's `og:image` / `twitter:image` meta tags
//!
//! Every step is infallible from the caller's point of view. HTML is scanned
//! with regexes, not parsed.

use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::feed::HttpFetch;
use crate::models::{MediaRef, RawFeedItem};

static RE_IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^http\S*\.(?:jpe?g|png|webp|gif)(?:\?\S*)?$").unwrap()
});
static RE_IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"'<>]+)["']"#).unwrap()
});
static RE_META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<meta\b[^>]*>").unwrap());
static RE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(property|name|content)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

const IMAGE_META_KEYS: &[&str] = &[
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

/// Make a scraped image URL absolute and https.
///
/// `//host/x` and `http://host/x` become `https://host/x`; `/x` is resolved
/// against `article_url`. Anything else is returned as given.
pub fn normalize_image_url(raw: &str, article_url: Option<&str>) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if raw.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://")) {
        return format!("https://{}", &raw[7..]);
    }
    if raw.starts_with('/') {
        let joined = article_url
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(raw).ok());
        if let Some(url) = joined {
            return url.to_string();
        }
    }
    raw.to_string()
}

fn usable(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

fn first_media(entries: &[MediaRef]) -> Option<String> {
    entries
        .iter()
        .filter(|m| !m.is_non_image())
        .find_map(|m| usable(&m.url))
}

pub fn from_enclosure(item: &RawFeedItem) -> Option<String> {
    item.enclosure
        .as_ref()
        .filter(|e| e.is_image())
        .and_then(|e| usable(&e.url))
}

pub fn from_media_content(item: &RawFeedItem) -> Option<String> {
    first_media(&item.media_content)
}

pub fn from_media_group(item: &RawFeedItem) -> Option<String> {
    first_media(&item.media_group)
}

/// Last-resort scan over the item's known string fields.
pub fn from_string_fields(item: &RawFeedItem) -> Option<String> {
    item.string_fields()
        .map(str::trim)
        .find(|value| RE_IMAGE_URL.is_match(value))
        .map(str::to_string)
}

pub fn first_img_src(html: &str) -> Option<String> {
    RE_IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| usable(m.as_str()))
}

pub fn from_inline_html(item: &RawFeedItem) -> Option<String> {
    item.content
        .as_deref()
        .and_then(first_img_src)
        .or_else(|| item.summary.as_deref().and_then(first_img_src))
}

/// First Open Graph / Twitter image declared in `html`, in document order.
pub fn meta_image(html: &str) -> Option<String> {
    for tag in RE_META_TAG.find_iter(html) {
        let mut key = None;
        let mut content = None;
        for caps in RE_ATTR.captures_iter(tag.as_str()) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if caps[1].eq_ignore_ascii_case("content") {
                content = Some(value);
            } else if key.is_none() {
                key = Some(value);
            }
        }

        let is_image_key = key.is_some_and(|k| {
            IMAGE_META_KEYS
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(k.trim()))
        });
        if is_image_key {
            if let Some(url) = content.and_then(usable) {
                return Some(url);
            }
        }
    }
    None
}

/// Runs the strategy chain for one item.
pub struct ImageResolver<'a, H: HttpFetch> {
    http: &'a H,
    page_timeout: Duration,
}

impl<'a, H: HttpFetch> ImageResolver<'a, H> {
    pub fn new(http: &'a H, page_timeout: Duration) -> Self {
        Self { http, page_timeout }
    }

    pub async fn resolve(&self, item: &RawFeedItem) -> Option<String> {
        let local = [
            ("enclosure", from_enclosure(item)),
            ("media:content", from_media_content(item)),
            ("media:group", from_media_group(item)),
            ("field scan", from_string_fields(item)),
            ("inline <img>", from_inline_html(item)),
        ];

        let found = match local.into_iter().find_map(|(step, hit)| hit.map(|url| (step, url))) {
            Some(hit) => Some(hit),
            None => self.from_article_page(item).await.map(|url| ("og:image", url)),
        };

        let (step, url) = found?;
        let url = normalize_image_url(&url, item.link.as_deref());
        debug!("Image for {:?} via {}: {}", item.title, step, url);
        Some(url)
    }

    async fn from_article_page(&self, item: &RawFeedItem) -> Option<String> {
        let link = item.link.as_deref().map(str::trim)?;
        if !(link.starts_with("http://") || link.starts_with("https://")) {
            return None;
        }

        match self.http.get(link, self.page_timeout).await {
            Ok(body) => meta_image(&String::from_utf8_lossy(&body)),
            Err(e) => {
                debug!("No og:image for {}: {}", link, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_protocol_relative() {
        assert_eq!(
            normalize_image_url("//cdn.example.com/x.jpg", None),
            "https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn test_normalize_upgrades_http() {
        assert_eq!(
            normalize_image_url("http://cdn.example.com/x.jpg", Some("https://site.com/a")),
            "https://cdn.example.com/x.jpg"
        );
        assert_eq!(
            normalize_image_url("HTTP://cdn.example.com/x.jpg", None),
            "https://cdn.example.com/x.jpg"
        );
        assert_eq!(
            normalize_image_url("Https://cdn.example.com/x.jpg", None),
            "Https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn test_normalize_root_relative() {
        assert_eq!(
            normalize_image_url("/img/x.jpg", Some("https://site.com/a")),
            "https://site.com/img/x.jpg"
        );
        // no usable base: leave it alone
        assert_eq!(normalize_image_url("/img/x.jpg", None), "/img/x.jpg");
        assert_eq!(normalize_image_url("/img/x.jpg", Some("not a url")), "/img/x.jpg");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(
            normalize_image_url("https://a.com/b.png", None),
            "https://a.com/b.png"
        );
        assert_eq!(normalize_image_url("img/rel.png", None), "img/rel.png");
    }

    #[test]
    fn test_enclosure_must_be_image() {
        let mut item = RawFeedItem {
            enclosure: Some(MediaRef::new("https://a.com/ep.mp3", Some("audio/mpeg"))),
            ..Default::default()
        };
        assert_eq!(from_enclosure(&item), None);

        item.enclosure = Some(MediaRef::new("https://a.com/pic.jpg", Some("image/jpeg")));
        assert_eq!(from_enclosure(&item).as_deref(), Some("https://a.com/pic.jpg"));
    }

    #[test]
    fn test_media_skips_audio_and_blank() {
        let item = RawFeedItem {
            media_content: vec![
                MediaRef::new("https://a.com/clip.mp4", Some("video/mp4")),
                MediaRef::new("  ", None),
                MediaRef::new("https://a.com/still.webp", None),
            ],
            ..Default::default()
        };
        assert_eq!(from_media_content(&item).as_deref(), Some("https://a.com/still.webp"));
        assert_eq!(from_media_group(&item), None);
    }

    #[test]
    fn test_string_field_scan() {
        let item = RawFeedItem {
            id: "https://a.com/?p=1".into(),
            link: Some("https://a.com/photo.JPG?w=600".into()),
            ..Default::default()
        };
        assert_eq!(
            from_string_fields(&item).as_deref(),
            Some("https://a.com/photo.JPG?w=600")
        );

        let no_hit = RawFeedItem {
            summary: Some("see https://a.com/x.png for details".into()),
            ..Default::default()
        };
        assert_eq!(from_string_fields(&no_hit), None);
    }

    #[test]
    fn test_img_src() {
        assert_eq!(
            first_img_src(r#"<p>hi</p><IMG class="x" SRC='//cdn.a.com/1.png'><img src="/2.png">"#)
                .as_deref(),
            Some("//cdn.a.com/1.png")
        );
        assert_eq!(first_img_src("<img alt=\"no source\">"), None);
        assert_eq!(first_img_src("<img src=>"), None);
        assert_eq!(first_img_src("<img src=\"\">"), None);
        assert_eq!(first_img_src("<img src=\"unterminated"), None);
    }

    #[test]
    fn test_inline_html_prefers_content() {
        let item = RawFeedItem {
            summary: Some(r#"<img src="https://a.com/summary.png">"#.into()),
            content: Some(r#"<figure><img src="https://a.com/content.png"></figure>"#.into()),
            ..Default::default()
        };
        assert_eq!(from_inline_html(&item).as_deref(), Some("https://a.com/content.png"));
    }

    #[test]
    fn test_meta_image_any_attribute_order() {
        let html = r#"<head>
            <meta name="description" content="Nope">
            <meta content="https://cdn.site.com/tw.png" name="twitter:image">
            <meta property="og:image" content="https://cdn.site.com/og.png">
        </head>"#;
        assert_eq!(meta_image(html).as_deref(), Some("https://cdn.site.com/tw.png"));
    }

    #[test]
    fn test_meta_image_malformed() {
        assert_eq!(meta_image(r#"<meta property="og:image">"#), None);
        assert_eq!(meta_image(r#"<meta property="og:image" content="">"#), None);
        assert_eq!(meta_image(r#"<meta property="og:title" content="x.png">"#), None);
        assert_eq!(meta_image("<meta property=og:image content=https://a.com/x.png>"), None);
        assert_eq!(meta_image(""), None);
        assert_eq!(
            meta_image(r#"<meta property="og:image"><meta property='og:image:secure_url' content='https://a.com/s.jpg' />"#)
                .as_deref(),
            Some("https://a.com/s.jpg")
        );
    }
}
