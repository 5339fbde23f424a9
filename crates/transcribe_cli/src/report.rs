use std::time::Duration;

use colored::Colorize;
use transcribe_engine::{format_seconds, AssetOutcome, ScrapeError, ScrapeReport, WriteOutcome};

/// How much the console shows for each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Progress lines only.
    Normal,
    /// Progress lines and the resulting Markdown.
    Verbose,
    /// Nothing but the Markdown.
    MarkdownOnly,
}

pub struct Console {
    verbosity: Verbosity,
}

impl Console {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn progress(&self) -> bool {
        self.verbosity != Verbosity::MarkdownOnly
    }

    pub fn started(&self, reference: &str) {
        if self.progress() {
            println!("\n{}", reference.bold());
        }
    }

    pub fn finished(&self, report: &ScrapeReport, elapsed: Duration) {
        if self.progress() {
            if let Some(err) = &report.fetch_error {
                println!("{} {}", "could not fetch:".red(), err);
            }
            for asset in &report.assets {
                println!("{}", asset_line(asset));
            }
            if let Some(document) = &report.document {
                println!("{}", document_line(document));
            }
        }

        if self.verbosity != Verbosity::Normal {
            println!("{}", report.markdown);
        }

        if self.progress() {
            println!("{}", format!("{} seconds", format_seconds(elapsed)).dimmed());
        }
    }

    pub fn failed(&self, reference: &str, err: &ScrapeError) {
        eprintln!("{} {}: {}", "error:".red().bold(), reference, err);
    }
}

fn asset_line(asset: &AssetOutcome) -> String {
    let reference = asset.reference();
    match asset {
        AssetOutcome::Saved { .. } => format!("📎 {}", reference.local_file_name.green()),
        AssetOutcome::AlreadyExists { .. } => format!(
            "📎 {} {}",
            reference.local_file_name,
            "already exists".yellow()
        ),
        AssetOutcome::FetchFailed { error, .. } => {
            format!("📎 {} {}", reference.remote_url, error.to_string().red())
        }
        AssetOutcome::WriteFailed { message, .. } => {
            format!("📎 {} {}", reference.local_file_name, message.red())
        }
    }
}

fn document_line(outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Written(path) => format!("{} {}", "saved".green(), path.display()),
        WriteOutcome::AlreadyExists(path) => {
            format!("{} {}", path.display(), "already exists".yellow())
        }
    }
}
