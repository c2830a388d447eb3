use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

use crate::models::{Category, Post};
use crate::slug::slugify;

/// Outcome of looking up `/{category}/{slug}`.
#[derive(Debug, PartialEq)]
pub enum Route {
    Found(Post),
    /// The slug exists under another category; send the reader here instead.
    Redirect(String),
    NotFound,
}

/// Read-only view over the directory the pipeline writes into.
pub struct PostStore {
    dir: PathBuf,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_post(path: &Path) -> Result<Post> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let post = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(post)
    }

    /// Every post, newest first.
    pub fn all(&self) -> Result<Vec<Post>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_post(&path) {
                Ok(post) => posts.push(post),
                Err(e) => warn!("Skipping unreadable post: {:#}", e),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    /// Only well-formed slugs are looked up; anything else (`..`, `/`) is unknown.
    pub fn get(&self, slug: &str) -> Result<Option<Post>> {
        if slug.is_empty() || slugify(slug) != slug {
            return Ok(None);
        }
        let path = self.dir.join(format!("{}.json", slug));
        if !path.exists() {
            return Ok(None);
        }
        Self::read_post(&path).map(Some)
    }

    pub fn by_category(&self, category: Category) -> Result<Vec<Post>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| p.category == category)
            .collect())
    }

    pub fn resolve(&self, category_path: &str, slug: &str) -> Result<Route> {
        let Some(post) = self.get(slug)? else {
            return Ok(Route::NotFound);
        };
        let Some(requested) = Category::from_path(category_path) else {
            return Ok(Route::NotFound);
        };

        if requested != post.category {
            return Ok(Route::Redirect(post.canonical_path()));
        }
        Ok(Route::Found(post))
    }

    /// Up to `limit` other posts, same category first, topped up from the rest.
    pub fn related(&self, post: &Post, limit: usize) -> Result<Vec<Post>> {
        let others: Vec<Post> = self
            .all()?
            .into_iter()
            .filter(|p| p.slug != post.slug)
            .collect();

        let (same, rest): (Vec<Post>, Vec<Post>) =
            others.into_iter().partition(|p| p.category == post.category);

        Ok(same.into_iter().chain(rest).take(limit).collect())
    }
}
