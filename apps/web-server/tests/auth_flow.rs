//! Registration, login and logout over HTTP.

#[macro_use]
mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};

use async_trait::async_trait;
use uuid::Uuid;

use behonest_core::domain::User;
use behonest_core::error::RepoError;
use behonest_core::forms::{LoginForm, RegistrationForm};
use behonest_core::ports::{BaseRepository, UserRepository};
use behonest_infra::InMemoryUserRepository;
use common::*;

#[actix_web::test]
async fn test_homepage_access() {
    let state = test_state();
    let app = test_app!(state);

    let res = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (template, _) = rendered(res).await;
    assert_eq!(template, "main/home.html");
}

#[actix_web::test]
async fn test_register_url() {
    let state = test_state();
    let app = test_app!(state);

    let res = test::call_service(&app, TestRequest::get().uri("/register/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (template, _) = rendered(res).await;
    assert_eq!(template, "main/register.html");
}

#[actix_web::test]
async fn test_register_success_redirects_and_persists_user() {
    let state = test_state();
    let app = test_app!(state);

    let req = TestRequest::post()
        .uri("/register/")
        .set_form(valid_user())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(set_session(&res).is_some(), "new user is signed in");

    let user = state.users.find_by_username("testuser3").await.unwrap();
    let user = user.expect("user persisted");
    assert_eq!(user.email, "testemail@gmail.com");
    assert_ne!(user.password_hash, "UncxYv234zzy");
}

#[actix_web::test]
async fn test_registered_user_sees_their_name() {
    let state = test_state();
    let app = test_app!(state);

    let req = TestRequest::post()
        .uri("/register/")
        .set_form(valid_user())
        .to_request();
    let cookie = set_session(&test::call_service(&app, req).await).unwrap();

    let req = TestRequest::get().uri("/").cookie(cookie).to_request();
    let (_, body) = rendered(test::call_service(&app, req).await).await;
    assert!(body.contains("testuser3"));
    assert!(body.contains("Log out"));
}

#[actix_web::test]
async fn test_invalid_registration_creates_no_user() {
    let state = test_state();
    let app = test_app!(state);

    let req = TestRequest::post()
        .uri("/register/")
        .set_form(invalid_user())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_session(&res).is_none());
    let (template, body) = rendered(res).await;
    assert_eq!(template, "main/register.html");
    assert!(body.contains("This field is required."));
    assert!(body.contains(r#"value="testemail@gmail.com""#));

    assert!(state.users.find_by_username("testuser3").await.unwrap().is_none());
    assert!(state.users.find_by_username("").await.unwrap().is_none());
}

#[test]
fn test_register_form_valid_and_invalid() {
    let form = |fields: [(&str, &str); 4]| RegistrationForm {
        username: fields[0].1.to_string(),
        email: fields[1].1.to_string(),
        password1: fields[2].1.to_string(),
        password2: fields[3].1.to_string(),
    };

    assert!(form(valid_user()).validate().is_ok());
    assert!(form(invalid_user()).validate().is_err());
}

/// Never finds a username, so only the insert can notice a duplicate.
struct BlindLookup(InMemoryUserRepository);

#[async_trait]
impl BaseRepository<User, Uuid> for BlindLookup {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        self.0.find_by_id(id).await
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        self.0.update(user).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0.delete(id).await
    }
}

#[async_trait]
impl UserRepository for BlindLookup {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        self.0.create(user).await
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        Ok(None)
    }
}

#[actix_web::test]
async fn test_concurrent_duplicate_registration_rerenders_form() {
    let mut state = test_state();
    let taken = InMemoryUserRepository::new();
    taken
        .create(User::new("testuser3".into(), "first@example.com".into(), "hash".into()))
        .await
        .unwrap();
    state.users = Arc::new(BlindLookup(taken));
    let app = test_app!(state);

    let req = TestRequest::post()
        .uri("/register/")
        .set_form(valid_user())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_session(&res).is_none());
    let (template, body) = rendered(res).await;
    assert_eq!(template, "main/register.html");
    assert!(body.contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_duplicate_username_is_rejected() {
    let state = test_state();
    let app = test_app!(state);
    create_user(&state, "testuser3", "something-else-9").await;

    let req = TestRequest::post()
        .uri("/register/")
        .set_form(valid_user())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let (_, body) = rendered(res).await;
    assert!(body.contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_login_url() {
    let state = test_state();
    let app = test_app!(state);

    let res = test::call_service(&app, TestRequest::get().uri("/login/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (template, _) = rendered(res).await;
    assert_eq!(template, "main/login.html");
}

#[actix_web::test]
async fn test_login_with_registration_payload_rerenders() {
    let state = test_state();
    let app = test_app!(state);

    let register = TestRequest::post()
        .uri("/register/")
        .set_form(valid_user())
        .to_request();
    test::call_service(&app, register).await;

    // The registration payload has no `password` field.
    let req = TestRequest::post()
        .uri("/login/")
        .set_form(valid_user())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_session(&res).is_none());
    let (template, _) = rendered(res).await;
    assert_eq!(template, "main/login.html");
}

#[actix_web::test]
async fn test_client_login() {
    let state = test_state();
    let app = test_app!(state);
    let user = create_user(&state, "testuser", "12345").await;

    let req = TestRequest::post()
        .uri("/login/")
        .set_form([("username", "testuser"), ("password", "12345")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    let cookie = set_session(&res).expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));

    let session = state.sessions.resolve(cookie.value()).await.unwrap();
    assert_eq!(session.user_id, user.id);

    let stored = state.users.find_by_username("testuser").await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[actix_web::test]
async fn test_login_follows_local_next_only() {
    let state = test_state();
    let app = test_app!(state);
    create_user(&state, "testuser", "12345").await;
    let credentials = [("username", "testuser"), ("password", "12345")];

    let req = TestRequest::post()
        .uri("/login/?next=%2Fposts%2F1%2F")
        .set_form(credentials)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/posts/1/");

    let req = TestRequest::post()
        .uri("/login/?next=https%3A%2F%2Fevil.example%2F")
        .set_form(credentials)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/");
}

#[actix_web::test]
async fn test_wrong_password_shows_error() {
    let state = test_state();
    let app = test_app!(state);
    create_user(&state, "testuser", "12345").await;

    let req = TestRequest::post()
        .uri("/login/")
        .set_form([("username", "testuser"), ("password", "wrong")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_session(&res).is_none());
    let (_, body) = rendered(res).await;
    assert!(body.contains("Please enter a correct username and password."));
}

#[actix_web::test]
async fn test_inactive_account_cannot_log_in() {
    let state = test_state();
    let app = test_app!(state);
    let mut user = create_user(&state, "dormant", "12345").await;
    user.is_active = false;
    state.users.update(user).await.unwrap();

    let req = TestRequest::post()
        .uri("/login/")
        .set_form([("username", "dormant"), ("password", "12345")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let (_, body) = rendered(res).await;
    assert!(body.contains(LoginForm::INACTIVE));
}

#[actix_web::test]
async fn test_login_rotates_existing_session() {
    let state = test_state();
    let app = test_app!(state);
    let user = create_user(&state, "testuser", "12345").await;
    let old = session_cookie(&state, &user).await;

    let req = TestRequest::post()
        .uri("/login/")
        .cookie(old.clone())
        .set_form([("username", "testuser"), ("password", "12345")])
        .to_request();
    let res = test::call_service(&app, req).await;

    let new = set_session(&res).unwrap();
    assert_ne!(new.value(), old.value());
    assert!(state.sessions.resolve(old.value()).await.is_none());
}

#[actix_web::test]
async fn test_logout_url() {
    let state = test_state();
    let app = test_app!(state);

    let res = test::call_service(&app, TestRequest::get().uri("/logout/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
}

#[actix_web::test]
async fn test_logout_ends_session() {
    let state = test_state();
    let app = test_app!(state);
    let user = create_user(&state, "testuser", "12345").await;
    let cookie = session_cookie(&state, &user).await;

    let req = TestRequest::post()
        .uri("/logout/")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    let cleared = set_session(&res).unwrap();
    assert_eq!(cleared.value(), "");
    assert!(state.sessions.resolve(cookie.value()).await.is_none());
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_login_posts_are_rate_limited() {
    let state = test_state();
    let app = test_app!(state);

    let mut last = StatusCode::OK;
    for _ in 0..21 {
        let req = TestRequest::post()
            .uri("/login/")
            .set_form([("username", "nobody"), ("password", "wrong")])
            .to_request();
        last = test::call_service(&app, req).await.status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);

    // Rendering the form is never limited.
    let res = test::call_service(&app, TestRequest::get().uri("/login/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_rotating_forwarded_for_shares_one_budget() {
    let state = test_state();
    let app = test_app!(state);

    let mut limited = 0;
    for i in 0..30 {
        let req = TestRequest::post()
            .uri("/login/")
            .peer_addr(format!("192.0.2.7:{}", 50000 + i).parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("10.0.0.{i}")))
            .set_form([("username", "nobody"), ("password", "wrong")])
            .to_request();
        if test::call_service(&app, req).await.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    assert!(limited >= 9, "only {limited} of 30 were limited");
}

#[actix_web::test]
async fn test_unknown_username_still_hashes() {
    let passwords = Arc::new(CountingPasswords::default());
    let state = test_state().with_password_service(passwords.clone());
    create_user(&state, "realuser", "UncxYv234zzy").await;
    let app = test_app!(state);
    let before = passwords.calls();

    let req = TestRequest::post()
        .uri("/login/")
        .set_form([("username", "nosuchuser"), ("password", "UncxYv234zzy")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (_, body) = rendered(res).await;
    assert!(body.contains(LoginForm::INVALID_LOGIN));
    assert_eq!(passwords.calls(), before + 1);

    let req = TestRequest::post()
        .uri("/login/")
        .set_form([("username", "realuser"), ("password", "wrong-password")])
        .to_request();
    test::call_service(&app, req).await;
    assert_eq!(passwords.calls(), before + 2);
}
