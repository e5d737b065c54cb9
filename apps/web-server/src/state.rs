//! Application state - shared across all handlers.

use std::sync::Arc;

use behonest_core::domain::User;
use behonest_core::ports::{
    BaseRepository, Cache, LikeRepository, PasswordService, PostRepository, RateLimiter,
    UserRepository,
};
use behonest_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryLikeRepository, InMemoryPostRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use behonest_infra::{
    DatabasePool, PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository,
};
#[cfg(feature = "rate-limit")]
use behonest_infra::{InMemoryRateLimiter, RateLimitConfig};

use crate::config::AppConfig;
use crate::session::SessionStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub cache: Arc<dyn Cache>,
    pub sessions: SessionStore,
    /// Limits POSTs to the login and register pages. `None` disables limiting.
    pub auth_limiter: Option<Arc<dyn RateLimiter>>,
    pub trust_proxy_headers: bool,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabasePool>,
}

impl AppState {
    /// Build the application state, connecting to PostgreSQL when configured.
    ///
    /// A failed connection falls back to in-memory repositories so the server
    /// still starts.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabasePool::connect(db_config).await {
                    Ok(pool) => {
                        let mut state = Self::in_memory(config);
                        state.users = Arc::new(PostgresUserRepository::new(pool.conn()));
                        state.posts = Arc::new(PostgresPostRepository::new(pool.conn()));
                        state.likes = Arc::new(PostgresLikeRepository::new(pool.conn()));
                        state.db = Some(pool);
                        tracing::info!("Application state initialized (postgres)");
                        return state;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        let state = Self::in_memory(config);
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    /// State backed entirely by in-memory adapters.
    pub fn in_memory(config: &AppConfig) -> Self {
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            likes: Arc::new(InMemoryLikeRepository::new()),
            passwords: Arc::new(Argon2PasswordService::new()),
            sessions: SessionStore::new(cache.clone(), config.session.clone())
                .purge_on_create(!sweep_scheduled(config)),
            cache,
            auth_limiter: auth_limiter(config),
            trust_proxy_headers: config.auth_rate_limit.trust_proxy_headers,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Swap the password hasher, e.g. for cheaper parameters in tests.
    #[must_use]
    pub fn with_password_service(mut self, passwords: Arc<dyn PasswordService>) -> Self {
        self.passwords = passwords;
        self
    }

    /// The active user behind a session token, if any.
    ///
    /// Dangling, expired and inactive-user sessions all resolve to `None`.
    pub async fn session_user(&self, token: &str) -> Option<User> {
        let session = self.sessions.resolve(token).await?;

        match self.users.find_by_id(session.user_id).await {
            Ok(Some(user)) if user.is_active => Some(user),
            Ok(_) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session user");
                None
            }
        }
    }
}

#[cfg(feature = "rate-limit")]
fn auth_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    let limiter = InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: config.auth_rate_limit.max_requests,
        window: config.auth_rate_limit.window,
    });
    Some(Arc::new(limiter))
}

#[cfg(not(feature = "rate-limit"))]
fn auth_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    None
}

/// Whether the background job will purge expired sessions.
fn sweep_scheduled(config: &AppConfig) -> bool {
    cfg!(feature = "scheduler") && config.scheduler_enabled
}
