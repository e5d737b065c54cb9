//! Post listing, detail pages and likes.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use behonest_core::DomainError;
use behonest_core::domain::{NewLike, Post};
use behonest_core::error::RepoError;
use behonest_core::ports::{BaseRepository, LikeRepository, PostRepository};
use behonest_shared::ApiResponse;
use behonest_shared::dto::LikeResponse;

use crate::middleware::{AppResult, MaybeUser};
use crate::pages::{Page, PostDetailPage, PostListPage, PostSummary};
use crate::state::AppState;
use crate::urls::Route;

const PAGE_SIZE: u64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageParam {
    /// Kept as text so that garbage falls back to the first page instead of a 400.
    pub page: Option<String>,
}

/// GET /posts/
pub async fn post_list(
    state: web::Data<AppState>,
    user: MaybeUser,
    query: web::Query<PageParam>,
) -> AppResult<Page> {
    let total = state.posts.count().await?;
    let num_pages = total.div_ceil(PAGE_SIZE).max(1);
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
        .min(num_pages);

    let posts = state
        .posts
        .list_recent((page - 1) * PAGE_SIZE, PAGE_SIZE)
        .await?;
    let cards = summaries(&state, &posts).await?;

    let list = PostListPage {
        posts: cards,
        page,
        num_pages,
    };
    Ok(Page::ok(list.render(user.user())))
}

/// GET /posts/{id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    user: MaybeUser,
    path: web::Path<i64>,
) -> AppResult<Page> {
    let post = find_post(&state, path.into_inner()).await?;
    render_detail(&state, &user, &post).await
}

/// GET /posts/news/{id}/ - only posts of kind news.
pub async fn news_detail(
    state: web::Data<AppState>,
    user: MaybeUser,
    path: web::Path<i64>,
) -> AppResult<Page> {
    let id = path.into_inner();
    let post = find_post(&state, id).await?;
    if !post.is_news() {
        return Err(DomainError::not_found("News", id).into());
    }
    render_detail(&state, &user, &post).await
}

/// POST /posts/like/{pk}
///
/// Toggles the current user's like. Browsers are redirected back to the post;
/// script clients asking for JSON get the new like state.
pub async fn like_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    user: MaybeUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let detail = Route::for_post(&post);
    let user = user.require(detail.path())?;

    let liked = toggle_like(&state, user.id, post.id).await?;
    let likes = state.likes.count_for_post(post.id).await?;

    tracing::info!(username = %user.username, post_id = post.id, liked, "Like toggled");

    if wants_json(&req) {
        let message = if liked { "Post liked" } else { "Like removed" };
        let body = LikeResponse {
            post_id: post.id,
            liked,
            likes,
        };
        return Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(body, message)));
    }

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, detail.path()))
        .finish())
}

/// Remove the user's like if present, otherwise add one. Returns whether the
/// post is liked afterwards.
///
/// A concurrent toggle that got there first is treated as done.
pub async fn toggle_like(
    state: &AppState,
    user_id: Uuid,
    post_id: i64,
) -> Result<bool, RepoError> {
    match state.likes.find_by_user_and_post(user_id, post_id).await? {
        Some(like) => match state.likes.delete(like.id).await {
            Ok(()) | Err(RepoError::NotFound) => Ok(false),
            Err(e) => Err(e),
        },
        None => match state.likes.create(NewLike::new(user_id, post_id)).await {
            Ok(_) | Err(RepoError::Constraint(_)) => Ok(true),
            Err(e) => Err(e),
        },
    }
}

/// Listing cards with like counts.
pub(super) async fn summaries<'a>(
    state: &AppState,
    posts: &'a [Post],
) -> AppResult<Vec<PostSummary<'a>>> {
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let counts = state.likes.counts_for_posts(&ids).await?;

    Ok(posts
        .iter()
        .map(|post| PostSummary {
            post,
            likes: counts.get(&post.id).copied().unwrap_or(0),
        })
        .collect())
}

async fn find_post(state: &AppState, id: i64) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id).into())
}

async fn render_detail(state: &AppState, user: &MaybeUser, post: &Post) -> AppResult<Page> {
    let likes = state.likes.count_for_post(post.id).await?;
    let liked = match user.user() {
        Some(user) => state
            .likes
            .find_by_user_and_post(user.id, post.id)
            .await?
            .is_some(),
        None => false,
    };

    let page = PostDetailPage { post, likes, liked };
    Ok(Page::ok(page.render(user.user())))
}

fn wants_json(req: &HttpRequest) -> bool {
    let headers = req.headers();
    let xhr = headers
        .get("X-Requested-With")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    xhr || accepts_json
}
