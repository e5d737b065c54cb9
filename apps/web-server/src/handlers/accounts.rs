//! Homepage, registration, login and logout.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use behonest_core::domain::User;
use behonest_core::error::RepoError;
use behonest_core::forms::{FormErrors, LoginForm, RegistrationForm};
use behonest_core::ports::{BaseRepository, UserRepository};

use super::posts::summaries;
use crate::middleware::{AppResult, MaybeUser};
use crate::pages::{LoginPage, Page, RegisterPage, home_page};
use crate::state::AppState;
use crate::urls::{Route, safe_next};

const HOMEPAGE_POSTS: u64 = 5;
const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// `?next=` on the login page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextParam {
    pub next: Option<String>,
}

/// GET /
pub async fn homepage(state: web::Data<AppState>, user: MaybeUser) -> AppResult<Page> {
    let recent = state.posts.list_recent(0, HOMEPAGE_POSTS).await?;
    let cards = summaries(&state, &recent).await?;

    Ok(Page::ok(home_page(user.user(), &cards)))
}

/// GET /register/
pub async fn register_page(user: MaybeUser) -> Page {
    let page = RegisterPage {
        form: &RegistrationForm::default(),
        errors: &FormErrors::new(),
    };
    Page::ok(page.render(user.user()))
}

/// POST /register/
///
/// A valid submission creates the account, signs the new user in and
/// redirects to the homepage. Anything else re-renders the form.
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    user: MaybeUser,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let account = match form.validate() {
        Ok(account) => account,
        Err(errors) => return Ok(register_invalid(&form, &errors, &user)),
    };

    if state.users.find_by_username(&account.username).await?.is_some() {
        return Ok(register_duplicate(&form, &user));
    }

    let passwords = state.passwords.clone();
    let password = account.password;
    let hash = web::block(move || passwords.hash(&password)).await??;

    let mut new_user = User::new(account.username, account.email, hash);
    new_user.touch_login(chrono::Utc::now());

    let created = match state.users.create(new_user).await {
        Ok(created) => created,
        Err(RepoError::Constraint(_)) => return Ok(register_duplicate(&form, &user)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(username = %created.username, user_id = %created.id, "User registered");

    start_session(&state, &req, created.id, &Route::Homepage.path()).await
}

fn register_duplicate(form: &RegistrationForm, user: &MaybeUser) -> HttpResponse {
    let mut errors = FormErrors::new();
    errors.add("username", DUPLICATE_USERNAME);
    register_invalid(form, &errors, user)
}

fn register_invalid(
    form: &RegistrationForm,
    errors: &FormErrors,
    user: &MaybeUser,
) -> HttpResponse {
    tracing::debug!(username = %form.username, errors = %errors, "Registration rejected");
    let page = RegisterPage { form, errors };
    Page::ok(page.render(user.user())).into_response()
}

/// GET /login/
pub async fn login_page(user: MaybeUser, query: web::Query<NextParam>) -> Page {
    let page = LoginPage {
        form: &LoginForm::default(),
        errors: &FormErrors::new(),
        next: safe_next(query.next.as_deref()),
    };
    Page::ok(page.render(user.user()))
}

/// POST /login/
///
/// On success rotates the session and redirects to `next` (when it is a
/// local path) or the homepage.
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    user: MaybeUser,
    query: web::Query<NextParam>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let next = safe_next(query.next.as_deref());

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return Ok(login_invalid(&form, &errors, next, &user)),
    };

    let Some(mut account) = state.users.find_by_username(&credentials.username).await? else {
        tracing::info!(username = %credentials.username, "Login failed: unknown user");
        // Unknown usernames pay for one hash, like a wrong password does.
        let passwords = state.passwords.clone();
        let password = credentials.password;
        web::block(move || passwords.hash(&password)).await??;
        return Ok(login_failed(&form, LoginForm::INVALID_LOGIN, next, &user));
    };

    let passwords = state.passwords.clone();
    let password = credentials.password;
    let hash = account.password_hash.clone();
    let verified = web::block(move || passwords.verify(&password, &hash)).await??;

    if !verified {
        tracing::info!(username = %account.username, "Login failed: wrong password");
        return Ok(login_failed(&form, LoginForm::INVALID_LOGIN, next, &user));
    }
    if !account.is_active {
        tracing::info!(username = %account.username, "Login refused: inactive account");
        return Ok(login_failed(&form, LoginForm::INACTIVE, next, &user));
    }

    account.touch_login(chrono::Utc::now());
    let account = state.users.update(account).await?;

    tracing::info!(username = %account.username, user_id = %account.id, "User logged in");

    let location = next.map_or_else(|| Route::Homepage.path(), str::to_string);
    start_session(&state, &req, account.id, &location).await
}

fn login_failed(
    form: &LoginForm,
    message: &str,
    next: Option<&str>,
    user: &MaybeUser,
) -> HttpResponse {
    let mut errors = FormErrors::new();
    errors.add_non_field(message);
    login_invalid(form, &errors, next, user)
}

fn login_invalid(
    form: &LoginForm,
    errors: &FormErrors,
    next: Option<&str>,
    user: &MaybeUser,
) -> HttpResponse {
    let page = LoginPage { form, errors, next };
    Page::ok(page.render(user.user())).into_response()
}

/// GET or POST /logout/
///
/// Always redirects home, whether or not a session existed.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(token) = state.sessions.token_from(&req) {
        if let Err(e) = state.sessions.destroy(&token).await {
            tracing::error!(error = %e, "Failed to destroy session");
        } else {
            tracing::info!("User logged out");
        }
    }

    HttpResponse::Found()
        .insert_header((header::LOCATION, Route::Homepage.path()))
        .cookie(state.sessions.removal_cookie())
        .finish()
}

/// Replace any current session with a new one for `user_id` and redirect.
async fn start_session(
    state: &AppState,
    req: &HttpRequest,
    user_id: Uuid,
    location: &str,
) -> AppResult<HttpResponse> {
    if let Some(old) = state.sessions.token_from(req) {
        state.sessions.destroy(&old).await?;
    }
    let token = state.sessions.create(user_id).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(state.sessions.cookie(&token))
        .finish())
}
