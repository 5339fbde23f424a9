use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "transcribe")]
#[command(about = "Save web pages and local HTML files as clean Markdown")]
#[command(version)]
pub struct Cli {
    /// URL or file:// reference to scrape
    #[arg(short, long, value_name = "URL")]
    pub target: Option<String>,

    /// YAML list of references to scrape
    #[arg(short, long, value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Don't save anything or download assets
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the resulting Markdown
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the Markdown to stdout; implies --dry-run
    #[arg(short, long)]
    pub cli_mode: bool,

    /// Keep raw HTML, filtered HTML and raw Markdown next to each page
    #[arg(short, long)]
    pub debug: bool,

    /// Output root directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// RON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_dry_run(&self) -> bool {
        self.dry_run || self.cli_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags_parse() {
        let cli = Cli::parse_from(["transcribe", "-t", "https://a.example", "-n", "-v", "-d"]);
        assert_eq!(cli.target.as_deref(), Some("https://a.example"));
        assert!(cli.dry_run && cli.verbose && cli.debug);
        assert!(cli.list.is_none());
    }

    #[test]
    fn cli_mode_implies_dry_run() {
        let cli = Cli::parse_from(["transcribe", "-c", "-t", "https://a.example"]);
        assert!(!cli.dry_run);
        assert!(cli.is_dry_run());
    }
}
