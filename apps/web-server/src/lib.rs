//! # BeHonest web server
//!
//! Server-rendered accounts, posts and likes on actix-web.
//!
//! ## Feature Flags
//!
//! - `full` (default) - PostgreSQL, rate limiting and the background sweep
//! - `minimal` - In-memory storage only
//! - `postgres` - PostgreSQL repositories
//! - `rate-limit` - Per-IP limits on login and registration submissions
//! - `scheduler` - Periodic purge of expired sessions

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod urls;

#[cfg(feature = "scheduler")]
pub mod background;

use actix_web::web;

use middleware::RateLimitMiddleware;
use state::AppState;

/// Register the state and every route on an app.
///
/// ```ignore
/// App::new().configure(configure_app(state.clone()))
/// ```
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let auth_guard = RateLimitMiddleware::new(state.auth_limiter.clone())
            .trust_proxy_headers(state.trust_proxy_headers);
        cfg.app_data(web::Data::new(state));
        handlers::configure_routes(cfg, auth_guard);
    }
}
