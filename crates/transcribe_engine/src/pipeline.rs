use std::path::PathBuf;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;

use crate::assets::{AssetOutcome, AssetResolver, AssetSettings};
use crate::config::ScraperConfig;
use crate::convert::MarkdownConverter;
use crate::extract::{Container, ContentSelector, Extractor};
use crate::fetch::{failure_document, fetch_source, Fetcher, ReqwestFetcher};
use crate::filter::StructuralFilter;
use crate::location::{
    resolve_path, OutputLocation, FILTERED_HTML_SUFFIX, RAW_HTML_SUFFIX, RAW_MARKDOWN_SUFFIX,
};
use crate::persist::{write_file, PersistError, WriteOutcome};
use crate::postfilter::PostFilter;
use crate::source::{SourceError, SourceReference};
use crate::FetchError;

/// Per-run switches, as opposed to the persistent [`ScraperConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Do not download assets or write anything.
    pub dry_run: bool,
    /// Also write the raw HTML, filtered HTML and raw Markdown next to the document.
    pub debug: bool,
}

/// Errors that stop one reference from being processed. Fetch failures are
/// not among them: they end up in the document instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("cannot write output: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub source: SourceReference,
    pub location: OutputLocation,
    pub title: Option<String>,
    pub container: Container,
    /// Set when the page could not be fetched and the stand-in document was used.
    pub fetch_error: Option<FetchError>,
    pub markdown: String,
    /// `None` in dry runs.
    pub document: Option<WriteOutcome>,
    pub artifacts: Vec<WriteOutcome>,
    pub assets: Vec<AssetOutcome>,
}

/// Fetch → select → filter → convert → post-filter → assets → write, for one
/// reference at a time.
pub struct Scraper {
    fetcher: Box<dyn Fetcher>,
    output_root: PathBuf,
    overwrite_documents: bool,
    selector: ContentSelector,
    filter: StructuralFilter,
    converter: MarkdownConverter,
    post_filter: PostFilter,
    asset_settings: AssetSettings,
}

impl Scraper {
    pub fn new(config: &ScraperConfig) -> Self {
        Self::with_fetcher(config, ReqwestFetcher::new(config.fetch_settings()))
    }

    pub fn with_fetcher(config: &ScraperConfig, fetcher: impl Fetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            output_root: config.output_root.clone(),
            overwrite_documents: config.overwrite_documents,
            selector: ContentSelector::new(config.strip_body_landmarks),
            filter: StructuralFilter::new(config.filter_settings()),
            converter: MarkdownConverter::default(),
            post_filter: config.post_filter(),
            asset_settings: config.asset_settings(),
        }
    }

    pub fn output_root(&self) -> &std::path::Path {
        &self.output_root
    }

    pub async fn scrape(
        &self,
        reference: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeReport, ScrapeError> {
        let source = SourceReference::parse(reference)?;
        let location = if options.dry_run {
            OutputLocation::derive(&source, &self.output_root)
        } else {
            resolve_path(&source, &self.output_root)?
        };
        let write_enabled = !options.dry_run;
        let debug_dumps = write_enabled && options.debug;
        engine_info!("scraping {} into {:?}", source, location.page_dir());

        let (raw_html, fetch_error) = match fetch_source(self.fetcher.as_ref(), &source).await {
            Ok(html) => (html, None),
            Err(err) => {
                engine_warn!("fetch failed for {}: {}", source, err);
                (failure_document(&err), Some(err))
            }
        };

        let mut artifacts = Vec::new();
        if debug_dumps {
            dump_artifact(&location, RAW_HTML_SUFFIX, &raw_html, &mut artifacts);
        }

        let document = self.selector.select(&raw_html, source.base_url());
        let container = document.container();
        let title = document.title().map(str::to_string);
        engine_debug!("selected {:?} for {}", container, source);

        let document = self.filter.filter(document);
        if debug_dumps {
            dump_artifact(&location, FILTERED_HTML_SUFFIX, &document.to_html(), &mut artifacts);
        }

        let raw_markdown = self.converter.convert(&document);
        if debug_dumps {
            dump_artifact(&location, RAW_MARKDOWN_SUFFIX, &raw_markdown, &mut artifacts);
        }

        let mut markdown = self.post_filter.apply(&raw_markdown);

        let mut assets = Vec::new();
        let mut written = None;
        if write_enabled {
            let resolution = AssetResolver::new(self.fetcher.as_ref(), &self.asset_settings)
                .resolve(location.directory(), &markdown)
                .await;
            markdown = resolution.markdown;
            assets = resolution.outcomes;

            let outcome = write_file(&location.document_path(), &markdown, self.overwrite_documents)?;
            if let WriteOutcome::AlreadyExists(path) = &outcome {
                engine_info!("{:?} already exists", path);
            }
            written = Some(outcome);
        }

        Ok(ScrapeReport {
            source,
            location,
            title,
            container,
            fetch_error,
            markdown,
            document: written,
            artifacts,
            assets,
        })
    }
}

/// Debug artifacts are always overwritten; failures are logged, not fatal.
fn dump_artifact(
    location: &OutputLocation,
    suffix: &str,
    content: &str,
    artifacts: &mut Vec<WriteOutcome>,
) {
    let path = location.artifact_path(suffix);
    match write_file(&path, content, true) {
        Ok(outcome) => artifacts.push(outcome),
        Err(err) => engine_warn!("could not write debug artifact {:?}: {}", path, err),
    }
}
