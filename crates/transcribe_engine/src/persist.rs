use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("invalid output path {0:?}")]
    InvalidPath(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// What happened to a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// The file was there already and overwriting was not allowed; nothing changed.
    AlreadyExists(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::AlreadyExists(path) => path,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}

/// Ensure output directory exists; create it and all its ancestors if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file and a rename, so readers
/// never see a half-written file.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(
        &self,
        filename: &str,
        content: impl AsRef<[u8]>,
        overwrite: bool,
    ) -> Result<WriteOutcome, PersistError> {
        let target = self.dir.join(filename);
        if target.exists() && !overwrite {
            return Ok(WriteOutcome::AlreadyExists(target));
        }

        ensure_output_dir(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_ref())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(WriteOutcome::Written(target))
    }
}

/// Write `data` to `path`, honouring the overwrite policy.
pub fn write_file(
    path: &Path,
    data: impl AsRef<[u8]>,
    overwrite: bool,
) -> Result<WriteOutcome, PersistError> {
    let (Some(dir), Some(filename)) = (path.parent(), path.file_name().and_then(|f| f.to_str()))
    else {
        return Err(PersistError::InvalidPath(path.to_path_buf()));
    };
    AtomicFileWriter::new(dir.to_path_buf()).write(filename, data, overwrite)
}
