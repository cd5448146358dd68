//! Key-value JSON storage collaborator.
//!
//! The engine only needs `get(key) -> value|null` and `set(key, value)`, no
//! transactions. The in-memory implementation backs a single-process
//! deployment; swapping in a persistent store only touches this module.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

#[async_trait]
pub trait Storage: Send + Sync {
  async fn get(&self, key: &str) -> Option<Value>;
  async fn set(&self, key: &str, value: Value);
}

#[derive(Default)]
pub struct MemoryStore {
  inner: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl Storage for MemoryStore {
  async fn get(&self, key: &str) -> Option<Value> {
    self.inner.read().await.get(key).cloned()
  }

  async fn set(&self, key: &str, value: Value) {
    self.inner.write().await.insert(key.to_string(), value);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn set_then_get_round_trips() {
    let store = MemoryStore::default();
    assert!(store.get("missing").await.is_none());
    store.set("k", json!({"a": 1})).await;
    assert_eq!(store.get("k").await, Some(json!({"a": 1})));
  }
}
