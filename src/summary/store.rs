//! Folder store module
//!
//! A name-indexed, read-only view of the folder holding summary files.

use hyper::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("folder '{folder}' is not accessible: {source}")]
    FolderUnavailable {
        folder: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid file name: '{0}'")]
    InvalidName(String),
}

/// Handle to a file found in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
}

/// Name-indexed file storage.
///
/// Futures are not required to be `Send`; requests run on a `LocalSet`.
#[allow(async_fn_in_trait)]
pub trait FolderStore {
    /// Find a file by its exact name. `Ok(None)` means the file does not exist.
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Read the full content of a previously found file
    async fn read_content(&self, file: &StoredFile) -> Result<Bytes, StoreError>;
}

/// Folder store backed by a local directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    folder: PathBuf,
}

impl DirectoryStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Whether the folder exists and is a readable directory
    pub async fn is_accessible(&self) -> bool {
        fs::metadata(&self.folder)
            .await
            .is_ok_and(|meta| meta.is_dir())
    }

    fn folder_unavailable(&self, source: io::Error) -> StoreError {
        StoreError::FolderUnavailable {
            folder: self.folder.display().to_string(),
            source,
        }
    }
}

impl FolderStore for DirectoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredFile>, StoreError> {
        if !is_plain_file_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let meta = fs::metadata(&self.folder)
            .await
            .map_err(|e| self.folder_unavailable(e))?;
        if !meta.is_dir() {
            return Err(self.folder_unavailable(io::Error::other("not a directory")));
        }

        let path = self.folder.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(StoredFile {
                name: name.to_string(),
                path,
            })),
            // Directories and other non-files with the same name do not count
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                name: name.to_string(),
                source: e,
            }),
        }
    }

    async fn read_content(&self, file: &StoredFile) -> Result<Bytes, StoreError> {
        fs::read(&file.path)
            .await
            .map(Bytes::from)
            .map_err(|e| StoreError::Read {
                name: file.name.clone(),
                source: e,
            })
    }
}

/// A single path component: non-empty, no separators, no `..`, no NUL
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}
