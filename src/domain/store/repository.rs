//! Key-value store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::domain::DomainError;

/// Key-value store holding every aggregate of the gateway
///
/// Values are opaque strings (JSON documents in practice). Single-key
/// `get`/`set` are expected to be atomic; there are no multi-key
/// transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Reads the value under `key`
    ///
    /// An absent key is reported as [`DomainError::NotFound`] with the
    /// message `key does not exist`.
    async fn get(&self, key: &str) -> Result<String, DomainError>;

    /// Lists keys matching a Redis-style glob pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError>;

    /// Round-trips a trivial command to verify the store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        self.keys("__ping__").await.map(|_| ())
    }
}

/// Extension trait providing typed JSON get/set operations
pub trait KeyValueStoreExt: KeyValueStore {
    /// Reads and decodes a JSON document
    fn get_json<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<V, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            let raw = self.get(key).await?;
            serde_json::from_str(&raw).map_err(|e| {
                DomainError::serialization(format!("failed to unmarshal '{}': {}", key, e))
            })
        }
    }

    /// Encodes and stores a JSON document
    fn set_json<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let raw = serde_json::to_string(value).map_err(|e| {
                DomainError::serialization(format!("failed to marshal '{}': {}", key, e))
            })?;
            self.set(key, &raw).await
        }
    }

    /// Reads a JSON document, mapping absence to `None`
    fn find_json<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_json(key).await {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        }
    }
}

// Blanket implementation for all types implementing KeyValueStore
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}
