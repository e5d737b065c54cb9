use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Like, NewLike, NewPost, Post, User};
use crate::error::RepoError;

/// Generic repository trait shared by every stored entity.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is not stored.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert a new user. A taken username yields `RepoError::Constraint`.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    /// Exact (case-sensitive) username lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Posts ordered newest first.
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, i64> {
    /// Insert a like. A second like for the same (user, post) yields `RepoError::Constraint`.
    async fn create(&self, like: NewLike) -> Result<Like, RepoError>;

    async fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: i64,
    ) -> Result<Option<Like>, RepoError>;

    async fn count_for_post(&self, post_id: i64) -> Result<u64, RepoError>;

    /// Like counts keyed by post id. Posts without likes are absent from the map.
    async fn counts_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, u64>, RepoError>;
}
