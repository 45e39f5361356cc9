/// Persistence backends for a record collection
///
/// A backend only knows how to load and save a whole collection. Locking,
/// lookups and merging live in [`crate::RecordStore`].
use crate::error::{StoreError, StoreResult};
use crate::store::Record;
use async_trait::async_trait;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

#[async_trait]
pub trait Backend<T: Record>: Send + Sync {
    /// Diagnostic label used in logs and errors (e.g. "users")
    fn label(&self) -> &str;

    /// Load the full collection. A collection that does not exist yet is empty.
    async fn load(&self) -> StoreResult<Vec<T>>;

    /// Replace the full collection
    async fn save(&self, records: &[T]) -> StoreResult<()>;
}

/// Collection stored as a pretty-printed JSON array in a single file.
///
/// Writes go to a sibling `*.tmp` file which is then renamed over the
/// collection file, so readers never observe a half-written array.
pub struct JsonFileBackend<T> {
    label: String,
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileBackend<T> {
    pub fn new(label: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            label: label.into(),
            path: path.as_ref().to_path_buf(),
            _records: PhantomData,
        }
    }

    /// Create the collection file as an empty array when it is missing
    pub async fn ensure_initialized(&self) -> StoreResult<()> {
        match fs::try_exists(&self.path).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::info!(
                    label = %self.label,
                    path = %self.path.display(),
                    "initializing empty collection"
                );
                self.save(&[]).await
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            label: self.label.clone(),
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl<T: Record> Backend<T> for JsonFileBackend<T> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn load(&self) -> StoreResult<Vec<T>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        // A freshly touched file counts as "not written yet"
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(
                label = %self.label,
                path = %self.path.display(),
                error = %source,
                "collection file exists but cannot be parsed"
            );
            StoreError::Corrupt {
                label: self.label.clone(),
                path: self.path.clone(),
                source,
            }
        })
    }

    async fn save(&self, records: &[T]) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, &data)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(
            label = %self.label,
            records = records.len(),
            bytes = data.len(),
            "collection written"
        );
        Ok(())
    }
}

/// Collection held in process memory, mainly for tests and ephemeral runs
pub struct MemoryBackend<T> {
    label: String,
    records: Mutex<Vec<T>>,
}

impl<T: Record> MemoryBackend<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_records(label, Vec::new())
    }

    pub fn with_records(label: impl Into<String>, records: Vec<T>) -> Self {
        Self {
            label: label.into(),
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl<T: Record> Backend<T> for MemoryBackend<T> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn load(&self) -> StoreResult<Vec<T>> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[T]) -> StoreResult<()> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }
}
