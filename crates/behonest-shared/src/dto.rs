//! Data Transfer Objects - JSON bodies returned by the server.

use serde::{Deserialize, Serialize};

/// State of a post's like after a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub post_id: i64,
    /// Whether the requesting user now likes the post.
    pub liked: bool,
    /// Total likes on the post after the toggle.
    pub likes: u64,
}

/// Liveness and dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `"ok"`, `"unavailable"`, or `"in-memory"` when no database is configured.
    pub database: String,
    pub timestamp: String,
}
