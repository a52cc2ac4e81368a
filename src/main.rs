//! Command-line entry point for the Gestar resolution scraper

use clap::Parser;
use gestar_scraper::{Config, Event, Scraper};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scrape the Gestar resolution portal into per-date JSONL partitions
#[derive(Debug, Parser)]
#[command(name = "gestar-scraper", version, about)]
struct Cli {
    /// Output folder for the per-date `.jsonl` partitions
    #[arg(default_value = "resolutions/")]
    folder: PathBuf,

    /// Number of concurrent day workers
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Process only this many dates, sampled uniformly at random
    #[arg(long)]
    limit: Option<usize>,

    /// Do not embed the raw document markup in each record
    #[arg(long)]
    no_html: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> gestar_scraper::Result<()> {
    let config = Config {
        output_dir: cli.folder,
        concurrency: cli.concurrency,
        limit: cli.limit,
        include_html: !cli.no_html,
        ..Config::default()
    };

    let scraper = Scraper::new(config)?;

    let mut events = scraper.subscribe();
    let progress = tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;
        while let Ok(event) = events.recv().await {
            match event {
                Event::DatesDiscovered { found, scheduled } => {
                    println!("Found {found} dates to parse");
                    let b = ProgressBar::new(scheduled as u64);
                    b.set_style(
                        ProgressStyle::with_template(
                            "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                    b.set_message("Fetching dates");
                    bar = Some(b);
                }
                Event::DayCompleted { .. } => {
                    if let Some(b) = &bar {
                        b.inc(1);
                    }
                }
            }
        }
        if let Some(b) = bar {
            b.finish();
        }
    });

    let total = scraper.run().await?;

    // Dropping the scraper closes the event channel and ends the progress task
    drop(scraper);
    let _ = progress.await;

    println!("{total} resolutions parsed");
    Ok(())
}
