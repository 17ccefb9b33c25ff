//! Key-value store port definition
//!
//! Documents are JSON values grouped into named collections. Implementations
//! may be embedded (redb) or in-memory.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ApplicationError;

/// Persistent JSON document store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Read a document, `None` when the key is absent
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, ApplicationError>;

    /// Insert or replace a document
    async fn put(&self, collection: &str, key: &str, value: Value) -> Result<(), ApplicationError>;

    /// Delete a document, returning whether it existed
    async fn remove(&self, collection: &str, key: &str) -> Result<bool, ApplicationError>;

    /// All documents of a collection, ordered by key
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, ApplicationError>;

    /// Check if the store is reachable
    async fn is_healthy(&self) -> bool;
}

/// Extension trait for typed document access
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStorePort {
    /// Read and deserialize a document
    async fn get_as<T>(&self, collection: &str, key: &str) -> Result<Option<T>, ApplicationError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(collection, key).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ApplicationError::Internal(format!("Stored document is unreadable: {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Serialize and store a document
    async fn put_as<T>(
        &self,
        collection: &str,
        key: &str,
        value: &T,
    ) -> Result<(), ApplicationError>
    where
        T: Serialize + Send + Sync,
    {
        let value = serde_json::to_value(value)
            .map_err(|e| ApplicationError::Internal(format!("Document serialization error: {e}")))?;
        self.put(collection, key, value).await
    }
}

impl<T: KeyValueStorePort + ?Sized> KeyValueStoreExt for T {}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
    }

    #[tokio::test]
    async fn get_as_deserializes() {
        let mut store = MockKeyValueStorePort::new();
        store
            .expect_get()
            .withf(|c, k| c == "docs" && k == "a")
            .returning(|_, _| Ok(Some(json!({"name": "alpha"}))));

        let doc: Option<Doc> = store.get_as("docs", "a").await.unwrap();
        assert_eq!(
            doc,
            Some(Doc {
                name: "alpha".into()
            })
        );
    }

    #[tokio::test]
    async fn get_as_rejects_wrong_shape() {
        let mut store = MockKeyValueStorePort::new();
        store
            .expect_get()
            .returning(|_, _| Ok(Some(json!({"other": 1}))));

        let result: Result<Option<Doc>, _> = store.get_as("docs", "a").await;
        assert!(matches!(result, Err(ApplicationError::Internal(_))));
    }

    #[tokio::test]
    async fn put_as_serializes() {
        let mut store = MockKeyValueStorePort::new();
        store
            .expect_put()
            .withf(|c, k, v| c == "docs" && k == "b" && v == &json!({"name": "beta"}))
            .returning(|_, _, _| Ok(()));

        store
            .put_as("docs", "b", &Doc { name: "beta".into() })
            .await
            .unwrap();
    }
}
