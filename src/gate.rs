use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::models::Post;

/// Decides which freshly built posts get written this run.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub per_run_cap: usize,
    pub min_content_len: usize,
}

#[derive(Debug)]
pub struct Selection<C> {
    pub selected: Vec<C>,
    pub dropped_short: usize,
    pub dropped_existing: usize,
    pub dropped_over_cap: usize,
}

impl Gate {
    pub fn new(per_run_cap: usize, min_content_len: usize) -> Self {
        Self {
            per_run_cap,
            min_content_len,
        }
    }

    /// Drop short and already-known posts, then keep the `per_run_cap`
    /// newest. Anything over the cap is simply gone; nothing is queued.
    pub fn select<C: AsRef<Post>>(
        &self,
        candidates: Vec<C>,
        existing_slugs: &HashSet<String>,
    ) -> Selection<C> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut dropped_short = 0;
        let mut dropped_existing = 0;

        let mut kept: Vec<C> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let post = candidate.as_ref();
            if post.content.summary.chars().count() < self.min_content_len {
                debug!("Skipping {}: content too short", post.slug);
                dropped_short += 1;
                continue;
            }
            if existing_slugs.contains(&post.slug) || !seen.insert(post.slug.clone()) {
                debug!("Skipping {}: slug already exists", post.slug);
                dropped_existing += 1;
                continue;
            }
            kept.push(candidate);
        }

        kept.sort_by(|a, b| b.as_ref().date.cmp(&a.as_ref().date));
        let dropped_over_cap = kept.len().saturating_sub(self.per_run_cap);
        kept.truncate(self.per_run_cap);

        Selection {
            selected: kept,
            dropped_short,
            dropped_existing,
            dropped_over_cap,
        }
    }
}

/// One `<slug>.json` per post in a single directory.
pub struct PostWriter {
    dir: PathBuf,
}

impl PostWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))
    }

    pub fn existing_slugs(&self) -> Result<HashSet<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;

        let mut slugs = HashSet::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    slugs.insert(stem.to_string_lossy().into_owned());
                }
            }
        }
        Ok(slugs)
    }

    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug))
    }

    pub fn write(&self, post: &Post) -> Result<PathBuf> {
        let path = self.path_for(&post.slug);
        let json = serde_json::to_string_pretty(post)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved: {}", post.slug);
        Ok(path)
    }
}
