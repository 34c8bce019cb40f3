//! JSON snapshot files.
//!
//! The whole store is written after every change: first to a sibling
//! temporary file, then renamed over the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use biblio_core::{application::ApplicationError, error::LibraryError};

use super::state::{LibraryState, SNAPSHOT_VERSION, Snapshot};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("{path} is not a valid data file: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} was written by a newer version (format {found})")]
    Version { path: PathBuf, found: u32 },
}

impl From<SnapshotError> for LibraryError {
    fn from(err: SnapshotError) -> Self {
        ApplicationError::Storage {
            reason: err.to_string(),
        }
        .into()
    }
}

/// Load a snapshot. A missing file is an empty library.
pub fn load(path: &Path) -> Result<LibraryState, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No data file yet, starting empty");
            return Ok(LibraryState::default());
        }
        Err(source) => {
            return Err(SnapshotError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::Version {
            path: path.to_path_buf(),
            found: snapshot.version,
        });
    }
    Ok(snapshot.into())
}

pub fn save(path: &Path, state: &LibraryState) -> Result<(), SnapshotError> {
    let write_err = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_vec_pretty(&Snapshot::from(state)).map_err(|source| {
        SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}
