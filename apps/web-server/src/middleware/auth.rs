//! Session user extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;

use behonest_core::domain::User;

use super::error::AppError;
use crate::state::AppState;

/// Current session user, if any. Never rejects the request.
///
/// ```ignore
/// async fn page(MaybeUser(user): MaybeUser) -> impl Responder { ... }
/// ```
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The user, or a redirect to the login page that returns to `next`.
    pub fn require(self, next: impl Into<String>) -> Result<User, AppError> {
        self.0
            .ok_or_else(|| AppError::LoginRequired { next: next.into() })
    }
}

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async { Ok(MaybeUser(None)) });
        };
        let token = state.sessions.token_from(req);

        Box::pin(async move {
            let user = match token {
                Some(token) => state.session_user(&token).await,
                None => None,
            };
            Ok(MaybeUser(user))
        })
    }
}
