use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a post is a regular post or a news item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    News,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Post => "post",
            PostKind::News => "news",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(PostKind::Post),
            "news" => Ok(PostKind::News),
            other => Err(format!("unknown post kind: {other}")),
        }
    }
}

/// Post entity - a piece of content identified by an integer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub kind: PostKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_news(&self) -> bool {
        self.kind == PostKind::News
    }

    /// First `max_chars` characters of the body, with an ellipsis when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.body.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head.trim_end())
        } else {
            head
        }
    }
}

/// A post that has not been stored yet; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub kind: PostKind,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author_id: Option<Uuid>, title: String, body: String, kind: PostKind) -> Self {
        Self {
            author_id,
            title,
            body,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Attach the id assigned by storage.
    pub fn into_post(self, id: i64) -> Post {
        Post {
            id,
            author_id: self.author_id,
            title: self.title,
            body: self.body,
            kind: self.kind,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
