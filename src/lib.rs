//! Pulls news from RSS/Atom feeds, sorts each item into a category and
//! publishes a handful of new posts per run as JSON files, plus the read
//! side the site builds from (post lookup, canonical routes, sitemap).

pub mod classify;
pub mod config;
pub mod error;
pub mod feed;
pub mod gate;
pub mod image;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod post;
pub mod sitemap;
pub mod slug;
pub mod store;

pub use config::Config;
pub use error::FetchError;
pub use feed::{HttpFetch, ReqwestFetcher};
pub use models::{Category, FeedSource, Post, PostContent, RawFeedItem};
pub use pipeline::{Pipeline, RunSummary};
pub use store::{PostStore, Route};
