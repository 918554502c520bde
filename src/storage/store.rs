use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::Document;

/// Single JSON document on disk with serialized read-modify-write access.
///
/// Reads go straight to the file and never wait. Writes are funnelled through
/// a per-store mutex that hands out the slot in arrival order, so every
/// mutation sees the result of all mutations queued before it. Clones share
/// the same mutex.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Wrap a path without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a store, creating the file with an empty document if it is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);

        let exists = fs::try_exists(&store.path)
            .await
            .with_context(|| format!("Failed to check {}", store.path.display()))?;
        if !exists {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let _guard = store.write_lock.lock().await;
            store.write(&Document::default()).await?;
            info!(path = %store.path.display(), "created empty data file");
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest persisted document.
    ///
    /// A missing, unreadable or corrupt file yields the default document
    /// instead of an error. Mutations refuse to run on top of such a fallback
    /// unless the file is simply missing.
    pub async fn read(&self) -> Document {
        match self.load().await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(path = %self.path.display(), "data file missing, using empty document");
                Document::default()
            }
            Err(err) => {
                let reason = format!("{:#}", err);
                warn!(path = %self.path.display(), error = %reason, "data file unusable, using empty document");
                Document::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    async fn load(&self) -> Result<Option<Document>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let doc: Document = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        if !doc.untyped.is_empty() {
            debug!(
                path = %self.path.display(),
                count = doc.untyped.len(),
                "data file has records that could not be read, keeping them as-is"
            );
        }
        Ok(Some(doc))
    }

    /// The document a mutation starts from. A file that exists but cannot be
    /// loaded is never overwritten.
    async fn load_for_write(&self) -> Result<Document> {
        match self.load().await {
            Ok(doc) => Ok(doc.unwrap_or_default()),
            Err(err) => Err(err.context(format!(
                "Refusing to overwrite {}, fix or remove it first",
                self.path.display()
            ))),
        }
    }

    /// Apply `f` to the latest document under the write slot and persist the result.
    ///
    /// If `f` returns `None` nothing is written and the snapshot it was given
    /// is returned unchanged.
    pub async fn mutate<F>(&self, f: F) -> Result<Document>
    where
        F: FnOnce(Document) -> Option<Document>,
    {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.load_for_write().await?;

        match f(snapshot.clone()) {
            Some(next) => {
                self.write(&next).await?;
                Ok(next)
            }
            None => {
                debug!(path = %self.path.display(), "mutation produced no document, nothing written");
                Ok(snapshot)
            }
        }
    }

    /// Edit the latest document in place under the write slot, persist it and
    /// return whatever `f` produced.
    pub async fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> T,
    {
        self.try_update(|doc| Ok::<_, anyhow::Error>(f(doc))).await
    }

    /// Like [`Store::update`], but `f` may reject the change. On `Err` nothing
    /// is written, even if `f` had already touched the document.
    pub async fn try_update<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_for_write().await?;
        let output = match f(&mut doc) {
            Ok(output) => output,
            Err(err) => {
                debug!(path = %self.path.display(), "mutation rejected, nothing written");
                return Err(err);
            }
        };
        self.write(&doc).await?;
        Ok(output)
    }

    /// Sibling file the next document is staged in before it replaces the target.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    // Caller must hold the write lock.
    async fn write(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_vec_pretty(doc).context("Failed to serialize document")?;
        let staging = self.staging_path();

        if let Err(err) = Self::write_file(&staging, &json).await {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "staging file not removed");
            }
            return Err(err);
        }

        fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), bytes = json.len(), "document persisted");
        Ok(())
    }

    async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", path.display()))?;
        Ok(())
    }
}
