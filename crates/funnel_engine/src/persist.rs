use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store directory {path:?} is unusable: {message}")]
    StoreDir { path: PathBuf, message: String },
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `dir` (and parents) unless it already exists as a directory.
pub fn ensure_store_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |message: String| PersistError::StoreDir {
        path: dir.to_path_buf(),
        message,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable("not a directory".into())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))
        }
        Err(err) => Err(unusable(err.to_string())),
    }
}

/// Whole-file replacement inside one directory: a temp file in the same
/// directory is synced and then renamed over the target.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path written.
    pub fn write(&self, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf, PersistError> {
        ensure_store_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let io_err = |source: io::Error| PersistError::Io {
            path: target.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content.as_ref()).map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        // rename(2) replaces the target in one step on the same filesystem.
        tmp.persist(&target).map_err(|err| io_err(err.error))?;
        Ok(target)
    }
}
