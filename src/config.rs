use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};

use crate::models::{Category, FeedSource};

pub const DEFAULT_AUTHOR: &str = "Newsera Team";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; NewseraBot/1.0; +https://newsera.blog)";

pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("https://techcrunch.com/feed/", Category::Tech),
        FeedSource::new("https://www.theverge.com/rss/index.xml", Category::Tech),
        FeedSource::new("https://www.wired.com/feed/rss", Category::Tech),
        FeedSource::new("https://thehackernews.com/rss.xml", Category::Cybersecurity),
        FeedSource::new("https://www.bleepingcomputer.com/feed/", Category::Cybersecurity),
        FeedSource::new("https://www.darkreading.com/rss.xml", Category::Cybersecurity),
        FeedSource::new("https://www.espn.com/espn/rss/news", Category::Sports),
        FeedSource::new(
            "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10001147",
            Category::Business,
        ),
        FeedSource::new("https://www.politico.com/rss/politicopicks.xml", Category::Politics),
        FeedSource::new("https://www.sciencedaily.com/rss/top/science.xml", Category::Science),
    ]
}

/// Everything one ingestion run needs. Every field may be omitted from the
/// YAML file; omitted fields take the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub per_run_cap: usize,
    pub min_content_len: usize,
    pub default_author: String,
    pub user_agent: String,
    pub feed_timeout_secs: u64,
    pub page_timeout_secs: u64, // og:image fallback fetch
    pub base_url: String,
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("content/posts"),
            per_run_cap: 3,
            min_content_len: 50,
            default_author: DEFAULT_AUTHOR.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            feed_timeout_secs: 20,
            page_timeout_secs: 5,
            base_url: "https://newsera.blog".to_string(),
            feeds: default_feeds(),
        }
    }
}

impl Config {
    /// Load from `path`, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_yaml(path),
            None => {
                info!("No configuration file given, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_yaml(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;

        info!("Loaded {} feeds", config.feeds.len());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(anyhow!("No feeds configured"));
        }
        if let Some(feed) = self.feeds.iter().find(|f| f.url.trim().is_empty()) {
            return Err(anyhow!("Feed with empty url (category {})", feed.category));
        }
        if self.page_timeout_secs == 0 || self.feed_timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be at least one second"));
        }
        Ok(())
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    /// `public/sitemap.xml` under the site root, two levels above the posts directory.
    pub fn default_sitemap_path(&self) -> PathBuf {
        self.output_dir
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("public").join("sitemap.xml"))
            .unwrap_or_else(|| PathBuf::from("sitemap.xml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.per_run_cap, 3);
        assert_eq!(config.min_content_len, 50);
        assert_eq!(config.page_timeout(), Duration::from_secs(5));
        for category in Category::ALL {
            assert!(
                config.feeds.iter().any(|f| f.category == category),
                "no default feed for {}",
                category
            );
        }
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsera.yaml");
        fs::write(
            &path,
            r#"
per_run_cap: 5
output_dir: /tmp/posts
feeds:
  - url: https://example.com/feed
    category: sports
  - url: https://example.com/other
    category: "Business / Economic News"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.per_run_cap, 5);
        assert_eq!(config.min_content_len, 50);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/posts"));
        assert_eq!(
            config.feeds,
            vec![
                FeedSource::new("https://example.com/feed", Category::Sports),
                FeedSource::new("https://example.com/other", Category::Business),
            ]
        );
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "feeds:\n  - url: https://a.com\n    category: gaming\n").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        fs::write(&path, "feeds: []\n").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        assert!(Config::load(Some(dir.path().join("missing.yaml").as_path())).is_err());
    }

    #[test]
    fn test_no_path_means_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.feeds, default_feeds());
    }

    #[test]
    fn test_sitemap_path() {
        let config = Config::default();
        assert_eq!(config.default_sitemap_path(), PathBuf::from("public/sitemap.xml"));
    }
}
