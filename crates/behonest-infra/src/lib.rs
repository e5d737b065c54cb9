//! # BeHonest Infrastructure
//!
//! Concrete implementations of the ports defined in `behonest-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory storage only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `rate-limit` - Per-client rate limiting via governor

pub mod auth;
pub mod cache;
pub mod database;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use auth::Argon2PasswordService;
pub use cache::InMemoryCache;
pub use database::{
    DatabaseConfig, InMemoryLikeRepository, InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    DatabasePool, PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
