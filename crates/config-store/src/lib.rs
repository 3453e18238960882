//! Configuration Store
//!
//! Synchronous key-value persistence for operator-entered configuration
//! blobs. Two backends: in-memory (tests, demos) and a JSON file.

mod store;

pub use store::{load, save, ConfigStore, FileStore, MemoryStore};

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned")]
    Poisoned,
}
