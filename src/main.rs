use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};

use newsera::logger::{self, LogConfig};
use newsera::sitemap::Sitemap;
use newsera::{Category, Config, Pipeline, PostStore, ReqwestFetcher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion pass (the default)
    Fetch,
    /// Print stored posts, newest first
    List {
        /// Only this category, by URL path (tech, cybersecurity, ...)
        #[arg(long)]
        category: Option<String>,
    },
    /// Write sitemap.xml for the stored posts
    Sitemap {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(LogConfig::new(&args.log_level, args.log_file.clone()))?;

    let config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Fetch) {
        Command::Fetch => {
            let http = ReqwestFetcher::new(&config.user_agent)?;
            let summary = Pipeline::new(config, http).run().await?;
            for slug in &summary.written {
                println!("{}", slug);
            }
        }
        Command::List { category } => {
            let store = PostStore::new(&config.output_dir);
            let posts = match category {
                Some(path) => {
                    let category = Category::from_path(&path)
                        .ok_or_else(|| anyhow!("Unknown category path: {}", path))?;
                    store.by_category(category)?
                }
                None => store.all()?,
            };
            for post in posts {
                println!(
                    "{}  {:<26} {}",
                    post.date.format("%Y-%m-%d"),
                    post.category.name(),
                    post.canonical_path()
                );
            }
        }
        Command::Sitemap { out } => {
            let posts = PostStore::new(&config.output_dir).all()?;
            let path = out.unwrap_or_else(|| config.default_sitemap_path());
            Sitemap::build(&config.base_url, &posts, Utc::now()).write(&path)?;
        }
    }

    Ok(())
}
