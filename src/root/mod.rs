//! Static content under a document root.
//!
//! Request targets are mapped onto files below the configured root and loaded
//! into shared [`FileEntry`] buffers, optionally cached for later requests.

pub mod file_entry;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::config::StaticFilesConfig;
use crate::http::mime;

pub use file_entry::FileEntry;

pub struct DocRoot {
    document_root: PathBuf,
    index: String,
    cache: Option<RwLock<HashMap<PathBuf, Arc<FileEntry>>>>,
}

impl DocRoot {
    /// Check that the configured root is a readable directory and pin it to
    /// its canonical path.
    pub fn open(config: &StaticFilesConfig) -> anyhow::Result<Self> {
        let configured = &config.document_root;
        let document_root = std::fs::canonicalize(configured)
            .with_context(|| format!("invalid document root {}", configured.display()))?;

        if !document_root.is_dir() {
            anyhow::bail!("invalid document root {}: not a directory", configured.display());
        }
        std::fs::read_dir(&document_root)
            .with_context(|| format!("document root {} is not readable", configured.display()))?;

        Ok(Self {
            document_root,
            ..Self::new(config)
        })
    }

    pub fn new(config: &StaticFilesConfig) -> Self {
        Self {
            document_root: config.document_root.clone(),
            index: config.index.clone(),
            cache: config.cache.then(|| RwLock::new(HashMap::new())),
        }
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Map a request target onto a path below the document root.
    ///
    /// Query and fragment are ignored. Returns `None` for targets that try to
    /// climb out of the root with `..`.
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        let path = target.split(['?', '#']).next().unwrap_or("");
        let mut resolved = self.document_root.clone();

        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') => return None,
                s => resolved.push(s),
            }
        }

        if path.is_empty() || path.ends_with('/') {
            resolved.push(&self.index);
        }

        Some(resolved)
    }

    /// Find and load the file for `target`.
    ///
    /// `Ok(None)` means there is nothing to serve there.
    pub async fn lookup(&self, target: &str) -> io::Result<Option<Arc<FileEntry>>> {
        let Some(path) = self.resolve(target) else {
            tracing::debug!(request_target = %target, "refusing target outside the document root");
            return Ok(None);
        };

        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.read().await.get(&path) {
                return Ok(Some(Arc::clone(entry)));
            }
        }

        let Some(entry) = self.load(path.clone()).await? else {
            return Ok(None);
        };
        let entry = Arc::new(entry);

        if let Some(cache) = &self.cache {
            cache.write().await.insert(path, Arc::clone(&entry));
        }

        Ok(Some(entry))
    }

    async fn load(&self, mut path: PathBuf) -> io::Result<Option<FileEntry>> {
        let mut meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        if meta.is_dir() {
            path.push(&self.index);
            meta = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) if is_missing(&e) => return Ok(None),
                Err(e) => return Err(e),
            };
        }

        if !meta.is_file() {
            return Ok(None);
        }

        let buffer = tokio::fs::read(&path).await?;
        tracing::debug!(path = %path.display(), size = buffer.len(), "loaded file");

        Ok(Some(FileEntry {
            mime: mime::from_path(&path),
            modified: meta.modified().ok(),
            buffer: Bytes::from(buffer),
            path,
        }))
    }

    /// Number of cached entries.
    pub async fn cached(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.read().await.len(),
            None => 0,
        }
    }
}

// `/file.txt/more` fails with NotADirectory, which is still just a miss.
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
