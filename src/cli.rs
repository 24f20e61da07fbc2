use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::commands::ingest::IngestOptions;
use crate::commands::listings::Listing;
use crate::commands::photos::{PhotoFilter, PhotosOptions};
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "photo-archive",
    version,
    about = "Deduplicated sneaker photo archive and the read queries behind the site"
)]
struct Cli {
    /// Print the full command report as JSON.
    #[arg(long, global = true)]
    json: bool,
    /// Debug-level logging unless PHOTO_ARCHIVE_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge a batch of fetched records into the archive and save it.
    Ingest {
        /// JSON batch file, or `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// List photos, newest first.
    Photos(PhotosArgs),
    /// Players with photo counts.
    Players {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Brand buckets with photo counts.
    Brands {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Week labels with photo counts.
    Weeks {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summary statistics for the landing page.
    Stats,
    /// Resolved paths, config and archive health.
    Status,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("filter").args(["player", "brand", "week", "recent"])))]
struct PhotosArgs {
    #[arg(long)]
    player: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    /// Week label such as 2024-W01.
    #[arg(long)]
    week: Option<String>,
    /// Photos from the last DAYS days (configured window when omitted).
    #[arg(long, value_name = "DAYS", num_args = 0..=1)]
    recent: Option<Option<u32>>,
    #[arg(long)]
    limit: Option<usize>,
}

impl PhotosArgs {
    fn into_options(self) -> PhotosOptions {
        let filter = if let Some(slug) = self.player {
            PhotoFilter::Player(slug)
        } else if let Some(slug) = self.brand {
            PhotoFilter::Brand(slug)
        } else if let Some(label) = self.week {
            PhotoFilter::Week(label)
        } else if let Some(days) = self.recent {
            PhotoFilter::Recent(days)
        } else {
            PhotoFilter::All
        };
        PhotosOptions {
            filter,
            limit: self.limit,
        }
    }
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let status = if report.ok { "ok" } else { "issues" };
    eprintln!("{}: {status}", report.command);
    for detail in &report.details {
        eprintln!("  {detail}");
    }
    for issue in &report.issues {
        eprintln!("  issue: {issue}");
    }
    if let Some(data) = &report.data {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let report = match cli.command {
        Command::Ingest { input, dry_run } => {
            commands::ingest::run(&IngestOptions { input, dry_run })?
        }
        Command::Photos(args) => commands::photos::run(&args.into_options())?,
        Command::Players { limit } => commands::listings::run(Listing::Players, limit)?,
        Command::Brands { limit } => commands::listings::run(Listing::Brands, limit)?,
        Command::Weeks { limit } => commands::listings::run(Listing::Weeks, limit)?,
        Command::Stats => commands::stats::run()?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!("{} reported {} issue(s)", report.command, report.issues.len());
    }
    Ok(())
}
