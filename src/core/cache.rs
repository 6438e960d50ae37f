//! Key-value cache abstractions shared by the providers.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A named collection of byte entries with optional per-entry expiry.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    /// Returns `None` for missing or expired entries.
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);
}

/// Hands out collections by name.
pub trait Store: Send + Sync {
    /// When `persist` is set the collection lives on disk, otherwise in memory.
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
