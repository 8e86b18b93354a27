//! Store domain - key-value persistence contract

mod pattern;
mod repository;

pub use pattern::{GlobPattern, escape_glob};
pub use repository::{KeyValueStore, KeyValueStoreExt};

#[cfg(test)]
pub use repository::mock::MockStore;
