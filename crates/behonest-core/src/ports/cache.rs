use async_trait::async_trait;
use std::time::Duration;

/// Key/value store with optional per-entry expiry. Session records live here
/// under `session:<token>`.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Live value for `key`. Expired entries read as absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value`, replacing any previous entry. `None` never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> bool;

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize, CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
