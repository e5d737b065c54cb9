//! Application error type rendered as HTML error pages.

use std::fmt;
use std::time::Duration;

use actix_web::error::BlockingError;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};

use behonest_core::error::{DomainError, RepoError};
use behonest_core::ports::{AuthError, CacheError};

use crate::pages::{Page, error_page};
use crate::urls::Route;

/// Application-level error type. Form validation failures are not errors:
/// handlers re-render the form instead.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Anonymous access to a page that needs a user; redirects to the login page.
    LoginRequired { next: String },
    TooManyRequests { retry_after: Duration },
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::LoginRequired { next } => write!(f, "Login required for {}", next),
            AppError::TooManyRequests { retry_after } => {
                write!(f, "Too many requests, retry in {}s", retry_after.as_secs())
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::LoginRequired { next } => HttpResponse::Found()
                .insert_header((header::LOCATION, Route::login_then(next)))
                .finish(),
            AppError::NotFound(detail) => {
                tracing::debug!(detail = %detail, "Not found");
                let markup = error_page(status, "The page you requested does not exist.");
                Page::with_status(status, markup).into_response()
            }
            AppError::BadRequest(detail) => {
                Page::with_status(status, error_page(status, detail)).into_response()
            }
            AppError::TooManyRequests { retry_after } => {
                let secs = retry_after.as_secs().max(1);
                let detail = format!("Too many attempts. Try again in {secs} seconds.");
                let mut response =
                    Page::with_status(status, error_page(status, &detail)).into_response();
                if let Ok(value) = header::HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                Page::with_status(
                    status,
                    error_page(status, "Something went wrong on our side. Please try again later."),
                )
                .into_response()
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => AppError::Internal(format!("Password hashing: {msg}")),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Internal(format!("Session store: {err}"))
    }
}

impl From<BlockingError> for AppError {
    fn from(err: BlockingError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
