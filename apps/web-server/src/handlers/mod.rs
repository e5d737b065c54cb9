//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;

use actix_web::{HttpResponse, web};

use crate::middleware::{AppError, AppResult, RateLimitMiddleware};

/// Configure all application routes.
///
/// `auth_guard` wraps the register and login pages.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_guard: RateLimitMiddleware) {
    cfg.route("/health", web::get().to(health::health_check))
        // Main app
        .service(
            web::resource("/")
                .name("main:homepage")
                .route(web::get().to(accounts::homepage)),
        )
        .service(
            web::resource("/register/")
                .name("main:register")
                .wrap(auth_guard.clone())
                .route(web::get().to(accounts::register_page))
                .route(web::post().to(accounts::register)),
        )
        .service(
            web::resource("/login/")
                .name("main:login")
                .wrap(auth_guard)
                .route(web::get().to(accounts::login_page))
                .route(web::post().to(accounts::login)),
        )
        .service(
            web::resource("/logout/")
                .name("main:logout")
                .route(web::get().to(accounts::logout))
                .route(web::post().to(accounts::logout)),
        )
        // Post app
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/")
                        .name("post:base")
                        .route(web::get().to(posts::post_list)),
                )
                .service(
                    web::resource("/news/{id}/")
                        .name("post:news_detail")
                        .route(web::get().to(posts::news_detail)),
                )
                .service(
                    web::resource("/like/{pk}")
                        .name("post:like_post")
                        .route(web::post().to(posts::like_post)),
                )
                .service(
                    web::resource("/{id}/")
                        .name("post:post_detail")
                        .route(web::get().to(posts::post_detail)),
                ),
        )
        .default_service(web::to(not_found));
}

async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("No route matches".to_string()))
}
