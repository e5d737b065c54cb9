//! In-memory repositories, used when no database is configured and in tests.
//!
//! They enforce the same uniqueness rules as the PostgreSQL schema.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use behonest_core::domain::{Like, NewLike, NewPost, Post, User};
use behonest_core::error::RepoError;
use behonest_core::ports::{BaseRepository, LikeRepository, PostRepository, UserRepository};

/// Rows keyed by an auto-incrementing id.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let post = new_post.into_post(table.allocate_id());
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<&Post> = table.rows.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.table.read().await.rows.len() as u64)
    }
}

/// In-memory like repository.
#[derive(Default)]
pub struct InMemoryLikeRepository {
    table: RwLock<Table<Like>>,
}

impl InMemoryLikeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Like, i64> for InMemoryLikeRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Like>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, like: Like) -> Result<Like, RepoError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|l| l.id != like.id && l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Err(RepoError::Constraint("like already exists".to_string()));
        }
        match table.rows.get_mut(&like.id) {
            Some(stored) => {
                *stored = like.clone();
                Ok(like)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn create(&self, new_like: NewLike) -> Result<Like, RepoError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|l| l.user_id == new_like.user_id && l.post_id == new_like.post_id)
        {
            return Err(RepoError::Constraint("like already exists".to_string()));
        }
        let like = new_like.into_like(table.allocate_id());
        table.rows.insert(like.id, like.clone());
        Ok(like)
    }

    async fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: i64,
    ) -> Result<Option<Like>, RepoError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
            .cloned())
    }

    async fn count_for_post(&self, post_id: i64) -> Result<u64, RepoError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|l| l.post_id == post_id)
            .count() as u64)
    }

    async fn counts_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, u64>, RepoError> {
        let table = self.table.read().await;
        let mut counts = HashMap::new();
        for like in table.rows.values().filter(|l| post_ids.contains(&l.post_id)) {
            *counts.entry(like.post_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
