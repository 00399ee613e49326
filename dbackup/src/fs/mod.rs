//! Filesystem layer: listing, metadata, free-space checks and atomic writes.

pub mod metadata;
pub mod space;
pub mod store;
pub mod walker;

pub use metadata::{EntryKind, StoreEntry};
pub use store::{FileStore, LocalStore};

#[cfg(test)]
pub(crate) mod memory;
