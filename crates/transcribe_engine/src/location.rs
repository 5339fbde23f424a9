use std::path::{Path, PathBuf};

use crate::filename::{sanitize_segment, short_hash, strip_extension};
use crate::persist::{ensure_output_dir, PersistError};
use crate::source::SourceReference;

/// Subdirectory of the output root that holds pages read from local files.
pub const LOCAL_NAMESPACE: &str = "local";

pub const MARKDOWN_SUFFIX: &str = ".md";
pub const RAW_HTML_SUFFIX: &str = ".raw.html";
pub const FILTERED_HTML_SUFFIX: &str = ".filtered.html";
pub const RAW_MARKDOWN_SUFFIX: &str = ".raw.md";

/// Where one page's output goes.
///
/// Assets are stored directly in [`directory`](Self::directory). The page
/// document and its debug artifacts live one level below, in
/// `directory/<base_name>/`, so a link to `../<asset>` from the document
/// always reaches the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    directory: PathBuf,
    base_name: String,
}

impl OutputLocation {
    /// Computes the location without touching the filesystem.
    pub fn derive(source: &SourceReference, root: &Path) -> Self {
        match source {
            SourceReference::Remote(url) => {
                let host = url
                    .host_str()
                    .map(|host| match url.port() {
                        Some(port) => format!("{host}:{port}"),
                        None => host.to_string(),
                    })
                    .unwrap_or_default();
                let mut segments: Vec<&str> = url
                    .path_segments()
                    .map(|segments| segments.filter(|s| !s.is_empty()).collect())
                    .unwrap_or_default();
                let last = segments.pop();

                let mut directory = root.join(sanitize_or(&host, "unknown-host"));
                for segment in segments {
                    let segment = sanitize_segment(segment);
                    if !segment.is_empty() {
                        directory.push(segment);
                    }
                }
                Self {
                    directory,
                    base_name: base_name_or_hash(last, url.as_str()),
                }
            }
            SourceReference::Local(path) => {
                let mut directory = root.join(LOCAL_NAMESPACE);
                if let Some(parent) = path
                    .parent()
                    .and_then(Path::file_name)
                    .and_then(|name| name.to_str())
                {
                    let parent = sanitize_segment(parent);
                    if !parent.is_empty() {
                        directory.push(parent);
                    }
                }
                let file_name = path.file_name().and_then(|name| name.to_str());
                Self {
                    directory,
                    base_name: base_name_or_hash(file_name, &path.to_string_lossy()),
                }
            }
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Directory holding the page document and its debug artifacts.
    pub fn page_dir(&self) -> PathBuf {
        self.directory.join(&self.base_name)
    }

    /// `<page_dir>/<base_name><suffix>`, e.g. with [`MARKDOWN_SUFFIX`].
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.page_dir().join(format!("{}{suffix}", self.base_name))
    }

    pub fn document_path(&self) -> PathBuf {
        self.artifact_path(MARKDOWN_SUFFIX)
    }

    /// Creates the asset directory and the page directory. Safe to repeat.
    pub fn ensure(&self) -> Result<(), PersistError> {
        ensure_output_dir(&self.directory)?;
        ensure_output_dir(&self.page_dir())
    }
}

/// Derive the output location for `source` under `root` and create its directories.
pub fn resolve_path(source: &SourceReference, root: &Path) -> Result<OutputLocation, PersistError> {
    let location = OutputLocation::derive(source, root);
    location.ensure()?;
    Ok(location)
}

fn sanitize_or(segment: &str, fallback: &str) -> String {
    let sanitized = sanitize_segment(segment);
    if sanitized.is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}

/// Extension-less name of the last segment; a hash of the whole reference
/// when there is no usable segment.
fn base_name_or_hash(segment: Option<&str>, reference: &str) -> String {
    segment
        .map(|segment| sanitize_segment(strip_extension(segment)))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| short_hash(reference))
}
