#![forbid(unsafe_code)]

pub mod persistence;
pub mod repository;
pub mod sqlite;

pub use persistence::QuizPersistence;
pub use repository::{InMemoryStore, Storage, StorageError, Store};
