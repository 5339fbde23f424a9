use std::collections::HashSet;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use crate::fetch::Fetcher;
use crate::filename::{sanitize_segment, short_hash};
use crate::persist::{AtomicFileWriter, WriteOutcome};
use crate::postfilter::PAREN_URL_RE;
use crate::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSettings {
    /// Extensions (without the dot) that mark a URL as a downloadable asset.
    pub extensions: Vec<String>,
    /// Replace asset files that already exist on disk.
    pub overwrite: bool,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "webp", "avif", "pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            overwrite: false,
        }
    }
}

impl AssetSettings {
    /// Whether the last path segment of `raw`, as written in the URL, ends in
    /// one of the asset extensions.
    pub fn is_asset_url(&self, raw: &str) -> bool {
        last_segment(raw)
            .and_then(|segment| segment.rsplit_once('.').map(|(_, ext)| ext.to_string()))
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}

fn last_segment(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let last = url.path_segments()?.next_back()?;
    Some(last.to_string())
}

/// An asset URL found in Markdown and the file name it is saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub remote_url: String,
    pub local_file_name: String,
}

impl AssetReference {
    /// Builds a reference from an absolute URL; `None` when the URL has no
    /// usable last path segment.
    pub fn from_url(raw: &str) -> Option<Self> {
        let local_file_name = sanitize_segment(&last_segment(raw)?);
        if local_file_name.is_empty() {
            return None;
        }
        Some(Self {
            remote_url: raw.to_string(),
            local_file_name,
        })
    }

    /// Same reference saved as `<stem>-<hash>.<ext>`, for a URL whose plain
    /// name is already taken by another URL.
    pub fn disambiguated(&self) -> Self {
        let hash = short_hash(&self.remote_url);
        let local_file_name = match self.local_file_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}-{hash}.{ext}"),
            None => format!("{}-{hash}", self.local_file_name),
        };
        Self {
            remote_url: self.remote_url.clone(),
            local_file_name,
        }
    }

    /// Link text that replaces the remote URL in the document.
    pub fn relative_link(&self) -> String {
        format!("../{}", self.local_file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Saved { reference: AssetReference, path: PathBuf },
    /// The file was already on disk; it was not downloaded again.
    AlreadyExists { reference: AssetReference, path: PathBuf },
    FetchFailed { reference: AssetReference, error: FetchError },
    WriteFailed { reference: AssetReference, message: String },
}

impl AssetOutcome {
    pub fn reference(&self) -> &AssetReference {
        match self {
            AssetOutcome::Saved { reference, .. }
            | AssetOutcome::AlreadyExists { reference, .. }
            | AssetOutcome::FetchFailed { reference, .. }
            | AssetOutcome::WriteFailed { reference, .. } => reference,
        }
    }

    /// Whether the Markdown now points at a local copy.
    pub fn is_local(&self) -> bool {
        matches!(self, AssetOutcome::Saved { .. } | AssetOutcome::AlreadyExists { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolution {
    pub markdown: String,
    pub outcomes: Vec<AssetOutcome>,
}

/// Distinct asset references in order of first appearance.
pub fn discover_assets(markdown: &str, settings: &AssetSettings) -> Vec<AssetReference> {
    let mut seen = HashSet::new();
    PAREN_URL_RE
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| seen.insert(*url))
        .filter(|url| settings.is_asset_url(url))
        .filter_map(AssetReference::from_url)
        .collect()
}

/// Downloads the assets a document links to and points the links at the local copies.
pub struct AssetResolver<'a> {
    fetcher: &'a dyn Fetcher,
    settings: &'a AssetSettings,
}

impl<'a> AssetResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, settings: &'a AssetSettings) -> Self {
        Self { fetcher, settings }
    }

    pub async fn resolve(&self, output_dir: &Path, markdown: &str) -> AssetResolution {
        let writer = AtomicFileWriter::new(output_dir.to_path_buf());
        let mut outcomes = Vec::new();
        let mut claimed = HashSet::new();

        for mut reference in discover_assets(markdown, self.settings) {
            if !claimed.insert(reference.local_file_name.clone()) {
                reference = reference.disambiguated();
                engine_debug!(
                    "asset name taken, saving {} as {}",
                    reference.remote_url,
                    reference.local_file_name
                );
                claimed.insert(reference.local_file_name.clone());
            }
            let outcome = self.resolve_one(&writer, output_dir, reference).await;
            outcomes.push(outcome);
        }

        // Longest first, so a URL that prefixes another cannot clobber it.
        let mut rewrites: Vec<&AssetReference> = outcomes
            .iter()
            .filter(|outcome| outcome.is_local())
            .map(AssetOutcome::reference)
            .collect();
        rewrites.sort_by_key(|reference| std::cmp::Reverse(reference.remote_url.len()));

        let mut markdown = markdown.to_string();
        for reference in rewrites {
            markdown = markdown.replace(&reference.remote_url, &reference.relative_link());
        }

        AssetResolution { markdown, outcomes }
    }

    async fn resolve_one(
        &self,
        writer: &AtomicFileWriter,
        output_dir: &Path,
        reference: AssetReference,
    ) -> AssetOutcome {
        let path = output_dir.join(&reference.local_file_name);
        if path.exists() && !self.settings.overwrite {
            engine_debug!("asset {} already stored at {:?}", reference.remote_url, path);
            return AssetOutcome::AlreadyExists { reference, path };
        }

        let output = match self.fetcher.fetch(&reference.remote_url).await {
            Ok(output) => output,
            Err(error) => {
                engine_warn!("asset {} not fetched: {}", reference.remote_url, error);
                return AssetOutcome::FetchFailed { reference, error };
            }
        };

        match writer.write(&reference.local_file_name, &output.bytes, self.settings.overwrite) {
            Ok(WriteOutcome::Written(path)) => AssetOutcome::Saved { reference, path },
            Ok(WriteOutcome::AlreadyExists(path)) => AssetOutcome::AlreadyExists { reference, path },
            Err(err) => {
                engine_warn!("asset {} not saved: {}", reference.remote_url, err);
                AssetOutcome::WriteFailed {
                    reference,
                    message: err.to_string(),
                }
            }
        }
    }
}
