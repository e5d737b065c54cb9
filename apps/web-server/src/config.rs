//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use behonest_infra::DatabaseConfig;

use crate::session::SessionConfig;
use crate::telemetry::TelemetryConfig;

/// Limits applied to login and registration submissions, per client IP.
#[derive(Debug, Clone)]
pub struct AuthRateLimit {
    pub max_requests: u32,
    pub window: Duration,
    /// Key clients on `Forwarded`/`X-Forwarded-For` instead of the socket
    /// peer. Only enable behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
    pub auth_rate_limit: AuthRateLimit,
    pub scheduler_enabled: bool,
    pub telemetry: TelemetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database: None,
            session: SessionConfig::default(),
            auth_rate_limit: AuthRateLimit {
                max_requests: 20,
                window: Duration::from_secs(60),
                trust_proxy_headers: false,
            },
            scheduler_enabled: true,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
            sqlx_logging: flag_var("DB_LOG_STATEMENTS").unwrap_or(false),
        });

        let session = SessionConfig {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session.cookie_name),
            ttl: parse_var("SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session.ttl),
            secure: flag_var("SESSION_COOKIE_SECURE").unwrap_or(defaults.session.secure),
        };

        let auth_rate_limit = AuthRateLimit {
            max_requests: parse_var("AUTH_RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or(defaults.auth_rate_limit.max_requests),
            window: parse_var("AUTH_RATE_LIMIT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.auth_rate_limit.window),
            trust_proxy_headers: flag_var("TRUST_PROXY_HEADERS")
                .unwrap_or(defaults.auth_rate_limit.trust_proxy_headers),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            database,
            session,
            auth_rate_limit,
            scheduler_enabled: flag_var("SCHEDULER_ENABLED").unwrap_or(defaults.scheduler_enabled),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// `0`, `false`, `no` and `off` are false; any other value is true.
fn flag_var(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| {
        !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert!(config.database.is_none());
        assert_eq!(config.session.cookie_name, "sessionid");
        assert_eq!(config.session.ttl, Duration::from_secs(1_209_600));
        assert!(!config.session.secure);
        assert!(!config.auth_rate_limit.trust_proxy_headers);
    }

    #[test]
    fn test_flag_var() {
        // SAFETY: the variable name is unique to this test.
        unsafe {
            env::set_var("BEHONEST_TEST_FLAG", "off");
        }
        assert_eq!(flag_var("BEHONEST_TEST_FLAG"), Some(false));
        unsafe {
            env::set_var("BEHONEST_TEST_FLAG", "yes");
        }
        assert_eq!(flag_var("BEHONEST_TEST_FLAG"), Some(true));
        assert_eq!(flag_var("BEHONEST_TEST_FLAG_UNSET"), None);
    }
}
