//! Transcribe engine: turns web pages and local HTML files into clean Markdown
//! with their images and documents stored alongside.
mod assets;
mod config;
mod convert;
mod decode;
mod extract;
mod fetch;
mod filename;
mod filter;
mod location;
mod persist;
mod pipeline;
mod postfilter;
mod source;
mod timing;
mod types;

pub use assets::{
    discover_assets, AssetOutcome, AssetReference, AssetResolution, AssetResolver, AssetSettings,
};
pub use config::{ConfigError, ScraperConfig};
pub use convert::MarkdownConverter;
pub use decode::{decode_html, DecodedHtml};
pub use extract::{Container, ContentSelector, Document, Extractor};
pub use fetch::{
    failure_document, fetch_source, FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT,
    FETCH_FAILURE_APOLOGY,
};
pub use filename::{sanitize_segment, short_hash, strip_extension};
pub use filter::{FilterSettings, StructuralFilter};
pub use location::{
    resolve_path, OutputLocation, FILTERED_HTML_SUFFIX, LOCAL_NAMESPACE, MARKDOWN_SUFFIX,
    RAW_HTML_SUFFIX, RAW_MARKDOWN_SUFFIX,
};
pub use persist::{ensure_output_dir, write_file, AtomicFileWriter, PersistError, WriteOutcome};
pub use pipeline::{ScrapeError, ScrapeOptions, ScrapeReport, Scraper};
pub use postfilter::{
    collapse_blank_runs, remove_empty_blockquote_lines, strip_trailing_whitespace,
    trim_blank_edges, PostFilter, RedirectRule,
};
pub use source::{SourceError, SourceReference};
pub use timing::{format_seconds, timed, Stopwatch};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
