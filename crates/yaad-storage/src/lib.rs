//! Yaad Storage crate - SQLite persistence, durable backends, Item Store.
//!
//! The Item Store keeps a per-conversation ephemeral tier in memory and an
//! optional per-user durable tier behind the `DurableBackend` trait.

pub mod db;
pub mod durable;
pub mod item_store;
pub mod migrations;

pub use db::Database;
pub use durable::{open_backend, DurableBackend, ItemDocument, MemoryBackend, SqliteBackend};
pub use item_store::ItemStore;
