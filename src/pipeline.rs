use anyhow::Result;
use chrono::Utc;
use log::{debug, info};

use crate::classify::Classifier;
use crate::config::Config;
use crate::feed::{FeedFetcher, HttpFetch};
use crate::gate::{Gate, PostWriter};
use crate::image::ImageResolver;
use crate::models::{Post, RawFeedItem};
use crate::post::{ItemText, PostBuilder};

/// Counts for one run, logged at the end and handed back to the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub fetched: usize,
    pub skipped_untitled: usize,
    pub classified: usize,
    pub dropped_short: usize,
    pub dropped_existing: usize,
    pub dropped_over_cap: usize,
    pub images_resolved: usize,
    pub written: Vec<String>,
}

/// A built post and the feed item it came from (needed later for the image).
struct Candidate {
    post: Post,
    item: RawFeedItem,
}

impl AsRef<Post> for Candidate {
    fn as_ref(&self) -> &Post {
        &self.post
    }
}

pub struct Pipeline<H: HttpFetch> {
    config: Config,
    http: H,
    classifier: Classifier,
}

impl<H: HttpFetch> Pipeline<H> {
    pub fn new(config: Config, http: H) -> Self {
        Self {
            config,
            http,
            classifier: Classifier::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One full ingestion pass: fetch, classify, build, gate, resolve images
    /// for the survivors and write them.
    ///
    /// Feed and image failures are absorbed. Filesystem failures are not.
    pub async fn run(&self) -> Result<RunSummary> {
        let writer = PostWriter::new(&self.config.output_dir);
        writer.ensure_dir()?;
        let existing = writer.existing_slugs()?;
        debug!("{} posts already on disk", existing.len());

        let mut summary = RunSummary::default();

        let fetcher = FeedFetcher::new(&self.http, self.config.feed_timeout());
        let report = fetcher.fetch_all(&self.config.feeds).await;
        summary.sources_ok = report.batches.len();
        summary.sources_failed = report.failed.len();

        let builder = PostBuilder::new(&self.config.default_author);
        let now = Utc::now();
        let mut candidates = Vec::new();

        for batch in report.batches {
            for item in batch.items {
                summary.fetched += 1;

                let text = ItemText::from_item(&item);
                let title = item.title.as_deref().unwrap_or_default();
                let category = self
                    .classifier
                    .classify(title, &text.body, batch.source.category);

                match builder.build(&item, &text, category, now) {
                    Some(post) => {
                        summary.classified += 1;
                        candidates.push(Candidate { post, item });
                    }
                    None => {
                        debug!("Skipping untitled item {:?} from {}", item.link, batch.source.url);
                        summary.skipped_untitled += 1;
                    }
                }
            }
        }

        info!("Found {} candidate posts", candidates.len());

        let gate = Gate::new(self.config.per_run_cap, self.config.min_content_len);
        let selection = gate.select(candidates, &existing);
        summary.dropped_short = selection.dropped_short;
        summary.dropped_existing = selection.dropped_existing;
        summary.dropped_over_cap = selection.dropped_over_cap;

        let resolver = ImageResolver::new(&self.http, self.config.page_timeout());
        for Candidate { mut post, item } in selection.selected {
            post.image = resolver.resolve(&item).await;
            if post.image.is_some() {
                summary.images_resolved += 1;
            }
            writer.write(&post)?;
            summary.written.push(post.slug);
        }

        info!(
            "Run complete: {} sources ok, {} failed, {} items fetched, {} new posts written",
            summary.sources_ok,
            summary.sources_failed,
            summary.fetched,
            summary.written.len()
        );
        Ok(summary)
    }
}
