//! Opaque index handle
//!
//! The index file is loaded into memory once at startup and shared read-only
//! by every worker. Its layout belongs to the search backend; this crate
//! only guarantees the bytes are present.

use crate::error::IndexError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loaded search index
#[derive(Clone)]
pub struct IndexHandle {
    path: PathBuf,
    data: Arc<[u8]>,
}

impl IndexHandle {
    /// Read an index file into memory
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| IndexError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, data)
    }

    /// Wrap bytes already in memory
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, IndexError> {
        let path = path.into();
        if data.is_empty() {
            return Err(IndexError::Malformed {
                path,
                reason: "file is empty".into(),
            });
        }
        Ok(Self {
            path,
            data: data.into(),
        })
    }

    /// Path the index was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw index bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size of the index in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHandle")
            .field("path", &self.path)
            .field("len", &self.data.len())
            .finish()
    }
}
