use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Where a page comes from. The scheme decides the variant and how it is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    Remote(Url),
    Local(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("invalid reference {reference:?}: {message}")]
    InvalidReference { reference: String, message: String },
    #[error("unsupported scheme {scheme:?} in {reference:?} (expected http, https or file)")]
    UnsupportedScheme { scheme: String, reference: String },
}

impl SourceReference {
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let reference = input.trim();
        let invalid = |message: String| SourceError::InvalidReference {
            reference: reference.to_string(),
            message,
        };

        let url = Url::parse(reference).map_err(|err| invalid(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => {
                if url.host_str().map_or(true, str::is_empty) {
                    return Err(invalid("missing host".into()));
                }
                Ok(SourceReference::Remote(url))
            }
            "file" => url
                .to_file_path()
                .map(SourceReference::Local)
                .map_err(|_| invalid("not a local file path".into())),
            other => Err(SourceError::UnsupportedScheme {
                scheme: other.to_string(),
                reference: reference.to_string(),
            }),
        }
    }

    /// URL that relative links inside the page are resolved against.
    pub fn base_url(&self) -> Option<Url> {
        match self {
            SourceReference::Remote(url) => Some(url.clone()),
            SourceReference::Local(path) => Url::from_file_path(path).ok(),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            SourceReference::Remote(_) => None,
            SourceReference::Local(path) => Some(path),
        }
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceReference::Remote(url) => f.write_str(url.as_str()),
            SourceReference::Local(path) => write!(f, "file://{}", path.display()),
        }
    }
}
