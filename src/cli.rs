//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

use crate::app_config::validate_url_prefix;

/// Browse series, chapters and page lists on HeanCMS hosts.
///
/// Without `--hostname` or a configured hostname, Temple Scan is used.
#[derive(Parser, Debug)]
#[command(name = "hean")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API hostname of the HeanCMS host (e.g. https://api.templescan.net)
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Path segment preceding the series slug in public URLs (e.g. /series/)
    #[arg(long, global = true, value_parser = parse_url_prefix)]
    pub url_prefix: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Search series by title
    Search {
        /// Title or part of a title
        term: String,
    },
    /// Show one series
    Show {
        /// Series slug or series URL
        series: String,
    },
    /// List the free chapters of a series in reading order
    Chapters {
        /// Series slug or series URL
        series: String,
    },
    /// Resolve the page images of one chapter
    Pages {
        /// Series slug or series URL
        series: String,
        /// Chapter locator as printed by `chapters`
        chapter: String,
    },
}

fn parse_url_prefix(value: &str) -> anyhow::Result<String> {
    validate_url_prefix(value)?;
    Ok(value.to_string())
}
