use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Like entity - joins a user to a post they liked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: Uuid,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A like that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLike {
    pub user_id: Uuid,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewLike {
    pub fn new(user_id: Uuid, post_id: i64) -> Self {
        Self {
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }

    pub fn into_like(self, id: i64) -> Like {
        Like {
            id,
            user_id: self.user_id,
            post_id: self.post_id,
            created_at: self.created_at,
        }
    }
}
