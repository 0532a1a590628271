//! Blob-store collaborator seam.
//!
//! The pipeline itself performs no network I/O; the external layer hands the
//! encoded bytes to a [`BlobStore`] under a key derived from opaque order
//! context. The in-memory implementation exists for tests and local runs.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("write failed for {key}: {reason}")]
    WriteFailed { key: String, reason: String },
}

/// Opaque `put(key, bytes)` destination for processed images.
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// In-memory store used by tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let mut objects = self.objects.lock().map_err(|_| StorageError::WriteFailed {
            key: key.to_string(),
            reason: "store lock poisoned".into(),
        })?;
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize an order-supplied folder name: spaces and filesystem-unsafe
/// characters become underscores, the rest is lowercased.
pub fn sanitize_folder(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == ' ' || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Build the destination key for a processed file under its order folder.
pub fn object_key(folder: &str, filename: &str) -> String {
    format!("uploads/{}/{}", sanitize_folder(folder), filename)
}
