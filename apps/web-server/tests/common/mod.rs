//! Shared helpers for HTTP flow tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test;

use behonest_core::domain::{NewPost, Post, PostKind, User};
use behonest_core::ports::{AuthError, PasswordService, PostRepository, UserRepository};
use behonest_infra::Argon2PasswordService;
use web_server::config::AppConfig;
use web_server::state::AppState;

/// In-memory state with cheap password hashing.
pub fn test_state() -> AppState {
    let passwords = Argon2PasswordService::with_params(1024, 1, 1).unwrap();
    AppState::in_memory(&AppConfig::default()).with_password_service(Arc::new(passwords))
}

/// Cheap Argon2 that counts every hash and verify.
#[derive(Default)]
pub struct CountingPasswords {
    pub calls: AtomicUsize,
}

impl CountingPasswords {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn inner() -> Argon2PasswordService {
        Argon2PasswordService::with_params(1024, 1, 1).unwrap()
    }
}

impl PasswordService for CountingPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Self::inner().hash(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Self::inner().verify(password, hash)
    }
}

/// Build the full application around `state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(web_server::configure_app($state.clone())),
        )
        .await
    };
}

pub fn valid_user() -> [(&'static str, &'static str); 4] {
    [
        ("username", "testuser3"),
        ("email", "testemail@gmail.com"),
        ("password1", "UncxYv234zzy"),
        ("password2", "UncxYv234zzy"),
    ]
}

pub fn invalid_user() -> [(&'static str, &'static str); 4] {
    [
        ("username", ""),
        ("email", "testemail@gmail.com"),
        ("password1", "pwd"),
        ("password2", "pwd"),
    ]
}

/// Store a user directly, bypassing the registration form.
pub async fn create_user(state: &AppState, username: &str, password: &str) -> User {
    let hash = state.passwords.hash(password).unwrap();
    let user = User::new(username.to_string(), format!("{username}@example.com"), hash);
    state.users.create(user).await.unwrap()
}

pub async fn create_post(state: &AppState, title: &str, kind: PostKind) -> Post {
    state
        .posts
        .create(NewPost::new(None, title.to_string(), "Body text".into(), kind))
        .await
        .unwrap()
}

/// A logged-in session cookie for `user`.
pub async fn session_cookie(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state.sessions.create(user.id).await.unwrap();
    state.sessions.cookie(&token)
}

pub fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The session cookie set by a response, if any.
pub fn set_session<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == "sessionid")
        .map(|c| c.into_owned())
}

/// Read the body and return it with the name of the template that rendered it.
pub async fn rendered<B: MessageBody>(res: ServiceResponse<B>) -> (String, String) {
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    let template = body
        .split_once(r#"data-template=""#)
        .and_then(|(_, rest)| rest.split_once('"'))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default();
    (template, body)
}
