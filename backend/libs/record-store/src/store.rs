use crate::backend::{Backend, JsonFileBackend, MemoryBackend};
use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A document that can live in a [`RecordStore`].
///
/// Records must serialize to a JSON object carrying their identifier under
/// [`Record::ID_FIELD`]. Collections are rewritten whole, so a record type
/// that must keep keys it does not model should collect them in a
/// `#[serde(flatten)]` map.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ID_FIELD: &'static str = "id";

    fn id(&self) -> Uuid;
}

/// Handle to one persisted collection.
///
/// Cloning is cheap; clones share the backend and the exclusive scope.
pub struct RecordStore<T: Record> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Record> {
    backend: Box<dyn Backend<T>>,
    // Serialises read-modify-write cycles on this collection
    scope: Mutex<()>,
}

impl<T: Record> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new(backend: impl Backend<T> + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                scope: Mutex::new(()),
            }),
        }
    }

    /// Open a JSON-file collection, creating an empty one if it is missing
    pub async fn open_json(label: &str, path: impl AsRef<Path>) -> StoreResult<Self> {
        let backend = JsonFileBackend::new(label, path);
        backend.ensure_initialized().await?;
        Ok(Self::new(backend))
    }

    pub fn in_memory(label: &str) -> Self {
        Self::new(MemoryBackend::new(label))
    }

    pub fn label(&self) -> &str {
        self.inner.backend.label()
    }

    /// All records in persisted order
    pub async fn find_all(&self) -> StoreResult<Vec<T>> {
        self.inner.backend.load().await
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        let records = self.find_all().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    /// First record whose serialized `field` equals `value`
    pub async fn find_by_field<V>(&self, field: &str, value: &V) -> StoreResult<Option<T>>
    where
        V: Serialize + ?Sized,
    {
        let wanted = serde_json::to_value(value)?;
        for record in self.find_all().await? {
            let document = serde_json::to_value(&record)?;
            if document.get(field) == Some(&wanted) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Append a record. No uniqueness or schema check happens here.
    pub async fn create(&self, record: T) -> StoreResult<T> {
        let _scope = self.inner.scope.lock().await;
        let mut records = self.inner.backend.load().await?;
        records.push(record.clone());
        self.inner.backend.save(&records).await?;

        tracing::debug!(label = %self.label(), id = %record.id(), "record created");
        Ok(record)
    }

    /// Shallow-merge `patch` onto the record with `id`.
    ///
    /// Patch keys overwrite, absent keys are preserved and the identifier is
    /// never replaced. A key the record does not serialize is rejected with
    /// [`StoreError::InvalidPatch`]. Returns `None` when no record matches.
    pub async fn update(&self, id: Uuid, patch: Value) -> StoreResult<Option<T>> {
        self.update_checked(id, patch, |_| Ok::<(), StoreError>(()))
            .await
    }

    /// Like [`RecordStore::update`], but runs `check` against the current
    /// collection inside the same exclusive scope before merging. An error
    /// from `check` aborts the update without writing.
    pub async fn update_checked<E, C>(
        &self,
        id: Uuid,
        patch: Value,
        check: C,
    ) -> Result<Option<T>, E>
    where
        E: From<StoreError>,
        C: FnOnce(&[T]) -> Result<(), E>,
    {
        let patch = match patch {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidPatch(format!(
                    "expected a JSON object, got {other}"
                ))
                .into())
            }
        };

        let _scope = self.inner.scope.lock().await;
        let mut records = self.inner.backend.load().await?;
        let Some(position) = records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        check(records.as_slice())?;

        let merged = merge_patch(&records[position], &patch)?;
        records[position] = merged.clone();
        self.inner.backend.save(&records).await?;

        tracing::debug!(
            label = %self.label(),
            %id,
            fields = patch.len(),
            "record updated"
        );
        Ok(Some(merged))
    }

    /// Remove every record with `id`; returns whether anything was removed
    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let _scope = self.inner.scope.lock().await;
        let mut records = self.inner.backend.load().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == before {
            return Ok(false);
        }

        self.inner.backend.save(&records).await?;
        tracing::debug!(label = %self.label(), %id, "record deleted");
        Ok(true)
    }

    /// Run `f` over the whole collection inside the exclusive scope.
    ///
    /// The collection is written once if `f` succeeds; if `f` fails nothing
    /// is written and its error is returned.
    pub async fn mutate<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
    {
        let _scope = self.inner.scope.lock().await;
        let mut records = self.inner.backend.load().await?;
        let outcome = f(&mut records)?;
        self.inner.backend.save(&records).await?;
        Ok(outcome)
    }
}

fn merge_patch<T: Record>(record: &T, patch: &Map<String, Value>) -> StoreResult<T> {
    let mut document = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => {
            return Err(StoreError::InvalidPatch(
                "record does not serialize to a JSON object".to_string(),
            ))
        }
    };

    for (key, value) in patch {
        if key == T::ID_FIELD {
            continue;
        }
        if !document.contains_key(key) {
            return Err(StoreError::InvalidPatch(format!("unknown field `{key}`")));
        }
        document.insert(key.clone(), value.clone());
    }

    serde_json::from_value(Value::Object(document))
        .map_err(|e| StoreError::InvalidPatch(e.to_string()))
}
