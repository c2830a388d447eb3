//! sitemap.xml for the site: the fixed pages plus one entry per post.
//!
//! The urlset layout and the borrowed-unless-escaped `escape_xml` follow
//! tola's sitemap generator.

use std::borrow::Cow;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;

use crate::models::Post;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const STATIC_ROUTES: &[(&str, &str, f32)] = &[
    ("/", "daily", 1.0),
    ("/tech", "daily", 0.8),
    ("/cybersecurity", "daily", 0.8),
    ("/sports", "daily", 0.7),
    ("/business", "daily", 0.7),
    ("/politics", "daily", 0.7),
    ("/science", "daily", 0.7),
    ("/about", "yearly", 0.3),
    ("/contact", "yearly", 0.3),
    ("/privacy", "yearly", 0.2),
];

#[derive(Debug)]
struct UrlEntry {
    loc: String,
    lastmod: DateTime<Utc>,
    changefreq: &'static str,
    priority: f32,
}

#[derive(Debug)]
pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

impl Sitemap {
    pub fn build(base_url: &str, posts: &[Post], now: DateTime<Utc>) -> Self {
        let base_url = base_url.trim_end_matches('/');

        let mut urls: Vec<UrlEntry> = STATIC_ROUTES
            .iter()
            .map(|&(path, changefreq, priority)| UrlEntry {
                loc: format!("{}{}", base_url, path),
                lastmod: now,
                changefreq,
                priority,
            })
            .collect();

        urls.extend(posts.iter().map(|post| UrlEntry {
            loc: format!("{}{}", base_url, post.canonical_path()),
            lastmod: post.date,
            changefreq: "weekly",
            priority: 0.7,
        }));

        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_xml(self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n",
            SITEMAP_NS
        );

        for entry in &self.urls {
            // Writing into a String cannot fail.
            let _ = write!(
                xml,
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
                escape_xml(&entry.loc),
                entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
                entry.changefreq,
                entry.priority,
            );
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let count = self.len();
        fs::write(path, self.into_xml())
            .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

        info!("Wrote sitemap with {} urls to {}", count, path.display());
        Ok(())
    }
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
