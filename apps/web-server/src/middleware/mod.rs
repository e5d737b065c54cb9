//! Middleware, extractors and the error type handlers return.

pub mod auth;
pub mod error;
pub mod rate_limit;

pub use auth::MaybeUser;
pub use error::{AppError, AppResult};
pub use rate_limit::RateLimitMiddleware;
