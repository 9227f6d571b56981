//! CLI entry point for the hean tool.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hean_core::{
    CacheWriter, Chapter, ChapterLocator, DEFAULT_URL_PREFIX, DirectoryCache, HeanConnector,
    HostConfig, NoCache, PageListOutcome, ProgressToken, ReqwestTransport, TEMPLE_SCAN_HOSTNAME,
    Transport, Work,
    transport::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS},
};
use serde::Serialize;
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{FileConfig, load_default_file_config};
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded = load_default_file_config()?;
    let file_config = loaded.config.clone().unwrap_or_default();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .verbosity
                .map_or("info", |verbosity| verbosity.default_level()),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, config_path = ?loaded.path, from_file = loaded.config.is_some(), "CLI arguments parsed");

    let connector = build_connector(&args, &file_config)?;
    info!(connector = connector.name(), hostname = connector.host().hostname(), "hean starting");

    match &args.command {
        Command::Search { term } => {
            let works = connector.find_by_title(term).await;
            if args.json {
                print_json(&works)?;
            } else if works.is_empty() {
                info!(%term, "No series found");
            } else {
                for work in &works {
                    println!("{}\t{}\t{}", work.id, work.title, work.status);
                }
            }
        }
        Command::Show { series } => {
            let work = resolve_work(&connector, series).await?;
            if args.json {
                print_json(&work)?;
            } else {
                print_work(&work);
            }
        }
        Command::Chapters { series } => {
            let work = resolve_work(&connector, series).await?;
            let chapters = connector.list_chapters(&work).await;
            if args.json {
                print_json(&chapters)?;
            } else {
                for chapter in &chapters {
                    println!(
                        "{}\t{}\t{}\t{}",
                        chapter.volume, chapter.number, chapter.locator, chapter.title
                    );
                }
            }
        }
        Command::Pages { series, chapter } => {
            let work = resolve_work(&connector, series).await?;
            let chapter = find_chapter(&connector, &work, chapter).await;

            let token = ProgressToken::new();
            let signal_token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal_token.request_cancellation();
                }
            });

            let outcome = connector.fetch_images(&work, &chapter, Some(&token)).await;
            let pages = match outcome {
                PageListOutcome::Pages(pages) => pages,
                other => bail!(
                    "Chapter '{}' returned {} ({})",
                    chapter.locator,
                    other.as_str(),
                    other.status_code()
                ),
            };
            if args.json {
                print_json(&pages)?;
            } else {
                for url in &pages.urls {
                    println!("{url}");
                }
                if let Some(path) = &pages.comic_info {
                    println!("# ComicInfo: {}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Builds the connector from CLI flags, falling back to the file config and
/// then to the Temple Scan preset.
fn build_connector(args: &Args, file_config: &FileConfig) -> Result<HeanConnector> {
    let hostname = args
        .hostname
        .as_deref()
        .or(file_config.hostname.as_deref())
        .unwrap_or(TEMPLE_SCAN_HOSTNAME);
    let url_prefix = args
        .url_prefix
        .as_deref()
        .or(file_config.url_prefix.as_deref())
        .unwrap_or(DEFAULT_URL_PREFIX);
    let host = HostConfig::new(hostname)?.with_url_prefix(url_prefix);

    let transport: Arc<dyn Transport> = Arc::new(
        ReqwestTransport::with_timeouts(
            file_config
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            file_config
                .read_timeout_secs
                .unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
        )
        .context("Failed to build HTTP client")?,
    );

    let cache: Arc<dyn CacheWriter> = match &file_config.cover_cache_dir {
        Some(dir) => {
            let cache = DirectoryCache::new(dir.clone(), Arc::clone(&transport));
            debug!(dir = %cache.dir().display(), "Caching covers");
            Arc::new(cache)
        }
        None => Arc::new(NoCache),
    };

    let connector = HeanConnector::new(host, transport, cache);
    if hostname.trim_end_matches('/') == TEMPLE_SCAN_HOSTNAME {
        Ok(connector.with_name("TempleScan"))
    } else {
        Ok(connector)
    }
}

/// Resolves a series given either as a URL or as a bare slug.
async fn resolve_work(connector: &HeanConnector, series: &str) -> Result<Work> {
    let resolved = if series.contains("://") {
        connector.resolve_by_url(series).await?
    } else {
        connector.resolve_by_slug(series).await?
    };
    resolved.with_context(|| format!("Series '{series}' was not found on {}", connector.host().hostname()))
}

/// Looks the chapter up in the free chapter list. Locators outside the list
/// (paid chapters, for instance) are still attempted without volume or
/// number metadata.
async fn find_chapter(connector: &HeanConnector, work: &Work, locator: &str) -> Chapter {
    let chapters = connector.list_chapters(work).await;
    if let Some(chapter) = chapters
        .into_iter()
        .find(|chapter| chapter.locator.as_str() == locator)
    {
        return chapter;
    }
    warn!(%locator, "Chapter is not among the free chapters; fetching anyway");
    Chapter::new(&work.id, "", "", "", ChapterLocator::new(locator))
}

fn print_work(work: &Work) {
    println!("{}", work.title);
    println!("  id:      {}", work.id);
    println!("  status:  {}", work.status);
    if !work.authors.is_empty() {
        println!("  authors: {}", work.authors.join(", "));
    }
    if let Some(year) = work.year {
        println!("  year:    {year}");
    }
    if !work.tags.is_empty() {
        println!("  tags:    {}", work.tags.join(", "));
    }
    if let Some(alt) = work.primary_alt_title() {
        println!("  alt:     {alt}");
    }
    println!("  url:     {}", work.website_url);
    if !work.description.is_empty() {
        println!();
        println!("{}", work.description);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
