//! Key-value store seam for the persisted thread id and credential.

use async_trait::async_trait;

use crate::error::StoreError;

/// Two-operation string store.
///
/// The thread lifecycle reads both slots at attach time and writes the thread
/// id on create and reset. Nothing else touches the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`. `None` clears the slot.
    async fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError>;
}
