mod batch;
mod cli;
mod report;

use anyhow::{bail, Result};
use clap::Parser;
use engine_logging::{engine_info, LevelFilter, LogDestination};
use transcribe_engine::{timed, ScrapeOptions, Scraper, ScraperConfig};

use crate::cli::Cli;
use crate::report::{Console, Verbosity};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(&cli);

    let mut config = match &cli.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output_root = output.clone();
    }

    let references = batch::collect_references(&cli)?;
    if references.is_empty() {
        bail!("No URL to scrape. Please give a --target or a YAML --list.");
    }

    let options = ScrapeOptions {
        dry_run: cli.is_dry_run(),
        debug: cli.debug,
    };
    let console = Console::new(if cli.cli_mode {
        Verbosity::MarkdownOnly
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let scraper = Scraper::new(&config);
    engine_info!(
        "processing {} reference(s) into {:?}",
        references.len(),
        scraper.output_root()
    );

    let mut failures = 0usize;
    for reference in &references {
        console.started(reference);
        let (result, elapsed) = timed(scraper.scrape(reference, options)).await;
        match result {
            Ok(report) => console.finished(&report, elapsed),
            Err(err) => {
                failures += 1;
                console.failed(reference, &err);
            }
        }
    }

    if failures == references.len() {
        bail!("none of the {} reference(s) could be processed", references.len());
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level);
}

