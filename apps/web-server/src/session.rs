//! Cookie sessions backed by the cache port.
//!
//! The cookie holds an opaque random token; the cache maps `session:<token>` to
//! the session record and expires it after the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use behonest_core::ports::{Cache, CacheError};

const TOKEN_LENGTH: usize = 64;
const KEY_PREFIX: &str = "session:";

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl: Duration,
    /// Send the cookie over HTTPS only.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
            ttl: Duration::from_secs(1_209_600),
            secure: false,
        }
    }
}

/// What the server remembers about a logged-in browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Creates, resolves and destroys sessions.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn Cache>,
    config: SessionConfig,
    purge_on_create: bool,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn Cache>, config: SessionConfig) -> Self {
        Self {
            cache,
            config,
            purge_on_create: false,
        }
    }

    /// Purge expired entries whenever a session is created. For deployments
    /// where the background sweep does not run.
    #[must_use]
    pub fn purge_on_create(mut self, purge: bool) -> Self {
        self.purge_on_create = purge;
        self
    }

    /// Start a session for `user_id`, returning the token to put in the cookie.
    pub async fn create(&self, user_id: Uuid) -> Result<String, CacheError> {
        if self.purge_on_create {
            match self.cache.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Purged expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "Failed to purge expired cache entries"),
            }
        }

        let token = generate_session_token();
        let data = SessionData {
            user_id,
            created_at: Utc::now(),
        };
        let value =
            serde_json::to_string(&data).map_err(|e| CacheError::Serialization(e.to_string()))?;

        self.cache
            .set(&cache_key(&token), &value, Some(self.config.ttl))
            .await?;

        Ok(token)
    }

    /// Look a token up. Unknown, expired and malformed tokens all yield `None`.
    pub async fn resolve(&self, token: &str) -> Option<SessionData> {
        if !is_well_formed(token) {
            return None;
        }

        let raw = self.cache.get(&cache_key(token)).await?;
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                None
            }
        }
    }

    pub async fn destroy(&self, token: &str) -> Result<(), CacheError> {
        if !is_well_formed(token) {
            return Ok(());
        }
        self.cache.delete(&cache_key(token)).await
    }

    /// Session token sent by the browser, if any.
    pub fn token_from(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.config.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|token| is_well_formed(token))
    }

    /// Cookie carrying a freshly created session token.
    pub fn cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(self.config.cookie_name.clone(), token.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .max_age(time::Duration::seconds(self.config.ttl.as_secs() as i64))
            .finish()
    }

    /// Cookie that makes the browser forget its session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.config.cookie_name.clone(), "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish();
        cookie.make_removal();
        cookie
    }
}

fn cache_key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Cryptographically secure random session token.
fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use behonest_infra::InMemoryCache;

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new(
            Arc::new(InMemoryCache::new()),
            SessionConfig {
                ttl,
                ..SessionConfig::default()
            },
        )
    }

    #[test]
    fn test_generate_session_token() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();

        assert_eq!(token1.len(), TOKEN_LENGTH);
        assert_ne!(token1, token2);
        assert!(is_well_formed(&token1));
    }

    #[actix_web::test]
    async fn test_create_resolve_destroy() {
        let sessions = store(Duration::from_secs(60));
        let user_id = Uuid::new_v4();

        let token = sessions.create(user_id).await.unwrap();
        assert_eq!(sessions.resolve(&token).await.unwrap().user_id, user_id);

        sessions.destroy(&token).await.unwrap();
        assert!(sessions.resolve(&token).await.is_none());
    }

    #[actix_web::test]
    async fn test_expired_session_does_not_resolve() {
        let sessions = store(Duration::from_millis(10));
        let token = sessions.create(Uuid::new_v4()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(sessions.resolve(&token).await.is_none());
    }

    #[actix_web::test]
    async fn test_create_can_purge_expired_sessions() {
        let cache = Arc::new(InMemoryCache::new());
        let config = SessionConfig {
            ttl: Duration::from_millis(10),
            ..SessionConfig::default()
        };
        let sessions = SessionStore::new(cache.clone(), config).purge_on_create(true);

        sessions.create(Uuid::new_v4()).await.unwrap();
        sessions.create(Uuid::new_v4()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.len().await, 2);

        sessions.create(Uuid::new_v4()).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[actix_web::test]
    async fn test_malformed_tokens_are_ignored() {
        let sessions = store(Duration::from_secs(60));
        assert!(sessions.resolve("short").await.is_none());
        assert!(sessions.resolve(&"!".repeat(TOKEN_LENGTH)).await.is_none());
        sessions.destroy("short").await.unwrap();
    }

    #[test]
    fn test_cookie_attributes() {
        let sessions = store(Duration::from_secs(3600));
        let cookie = sessions.cookie("abc");

        assert_eq!(cookie.name(), "sessionid");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));

        let removal = sessions.removal_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_token_from_request() {
        let sessions = store(Duration::from_secs(60));
        let token = generate_session_token();

        let req = TestRequest::default()
            .cookie(Cookie::new("sessionid", token.clone()))
            .to_http_request();
        assert_eq!(sessions.token_from(&req), Some(token));

        let req = TestRequest::default()
            .cookie(Cookie::new("sessionid", "tampered"))
            .to_http_request();
        assert_eq!(sessions.token_from(&req), None);
    }
}
