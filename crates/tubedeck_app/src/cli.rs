use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tubedeck_core::UrlFilter;

#[derive(Debug, Parser)]
#[command(name = "tubedeck", version, about = "Batch client for a media download registry")]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = "tubedeck.ron")]
    pub config: PathBuf,

    #[arg(
        short,
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warning, error)"
    )]
    pub log_level: String,

    #[arg(long, help = "Also write the log to ./tubedeck.log")]
    pub log_file: bool,

    #[arg(long, value_name = "URL", help = "Registry base URL")]
    pub server: Option<String>,

    #[arg(long)]
    pub quality: Option<String>,

    #[arg(long)]
    pub format: Option<String>,

    #[arg(long)]
    pub folder: Option<String>,

    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    #[arg(long, help = "Queue submissions without starting them")]
    pub no_auto_start: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Submit every URL of FILE, one per line. Ctrl-C cancels after the current URL.
    Import { file: PathBuf },
    /// Write the URLs matching FILTER (pending, completed, failed, all) to the export file.
    Export {
        #[arg(value_parser = parse_filter)]
        filter: UrlFilter,
    },
    /// Print the URLs matching FILTER.
    Copy {
        #[arg(value_parser = parse_filter)]
        filter: UrlFilter,
    },
    /// Print download counters and total speed.
    Metrics,
    /// Re-submit every failed download with its original parameters.
    RetryFailed,
    /// Remove finished downloads from the done list.
    ClearCompleted,
    /// Remove failed downloads from the done list.
    ClearFailed,
}

fn parse_filter(raw: &str) -> Result<UrlFilter, String> {
    raw.parse().map_err(|err: tubedeck_core::SelectionError| err.to_string())
}
