use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use mime::Mime;
use tracing::debug;

/// Document held by a [`DocumentStore`], addressed by a relative path.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub path: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

/// Storage for issued documents such as money receipts.
pub trait DocumentStore: Send + Sync {
    fn put(&self, path: &str, content_type: &Mime, bytes: &[u8]) -> Result<(), DocumentError>;
    fn get(&self, path: &str) -> Result<Option<StoredDocument>, DocumentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document path '{0}' must be relative and stay inside the document root")]
    InvalidPath(String),
    #[error("document storage failed: {0}")]
    Io(#[from] std::io::Error),
}

fn checked_relative(path: &str) -> Result<&Path, DocumentError> {
    let relative = Path::new(path);
    let clean = !path.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if clean {
        Ok(relative)
    } else {
        Err(DocumentError::InvalidPath(path.to_string()))
    }
}

/// Writes documents below a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentStore for FsDocumentStore {
    fn put(&self, path: &str, _content_type: &Mime, bytes: &[u8]) -> Result<(), DocumentError> {
        let target = self.root.join(checked_relative(path)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        debug!(path, bytes = bytes.len(), "document stored");
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<StoredDocument>, DocumentError> {
        let target = self.root.join(checked_relative(path)?);
        match fs::read(&target) {
            Ok(bytes) => Ok(Some(StoredDocument {
                path: path.to_string(),
                content_type: mime_guess::from_path(&target).first_or_octet_stream(),
                bytes,
            })),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process document store.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<String, StoredDocument>>>,
}

impl MemoryDocumentStore {
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .documents
            .lock()
            .expect("document mutex poisoned")
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put(&self, path: &str, content_type: &Mime, bytes: &[u8]) -> Result<(), DocumentError> {
        checked_relative(path)?;
        self.documents
            .lock()
            .expect("document mutex poisoned")
            .insert(
                path.to_string(),
                StoredDocument {
                    path: path.to_string(),
                    content_type: content_type.clone(),
                    bytes: bytes.to_vec(),
                },
            );
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<StoredDocument>, DocumentError> {
        Ok(self
            .documents
            .lock()
            .expect("document mutex poisoned")
            .get(path)
            .cloned())
    }
}
