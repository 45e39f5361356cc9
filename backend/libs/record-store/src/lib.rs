//! # Record Store
//!
//! Per-entity document store shared by Murmur repositories.
//!
//! Each [`RecordStore`] owns one homogeneous collection of JSON records
//! persisted through an injected [`Backend`]. Every operation loads the whole
//! collection; every mutation rewrites it. The store is intentionally small:
//! no indexes, no schema enforcement, no uniqueness guarantees.
//!
//! ## Concurrency
//!
//! Mutations on one collection run inside an exclusive scope
//! (`tokio::sync::Mutex`), so concurrent read-modify-write cycles inside a
//! process are serialised rather than silently overwriting each other.
//! [`RecordStore::mutate`] exposes that scope for multi-record changes that
//! must land in a single write.
//!
//! ## Modules
//! - `backend`: JSON file and in-memory persistence
//! - `error`: store error taxonomy
//! - `store`: the [`RecordStore`] handle and the [`Record`] trait
pub mod backend;
pub mod error;
pub mod store;

pub use backend::{Backend, JsonFileBackend, MemoryBackend};
pub use error::{StoreError, StoreResult};
pub use store::{Record, RecordStore};
