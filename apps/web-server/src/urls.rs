//! Named routes. `Route::path` is the single source of every URL the app links to.

use std::fmt;

use behonest_core::domain::Post;

/// Every reversible route in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Homepage,
    Register,
    Login,
    Logout,
    PostList,
    PostDetail(i64),
    NewsDetail(i64),
    LikePost(i64),
}

impl Route {
    /// `app:name` identifier, e.g. `main:login`.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Homepage => "main:homepage",
            Route::Register => "main:register",
            Route::Login => "main:login",
            Route::Logout => "main:logout",
            Route::PostList => "post:base",
            Route::PostDetail(_) => "post:post_detail",
            Route::NewsDetail(_) => "post:news_detail",
            Route::LikePost(_) => "post:like_post",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Homepage => "/".to_string(),
            Route::Register => "/register/".to_string(),
            Route::Login => "/login/".to_string(),
            Route::Logout => "/logout/".to_string(),
            Route::PostList => "/posts/".to_string(),
            Route::PostDetail(id) => format!("/posts/{id}/"),
            Route::NewsDetail(id) => format!("/posts/news/{id}/"),
            Route::LikePost(pk) => format!("/posts/like/{pk}"),
        }
    }

    /// The detail page matching the post's kind.
    pub fn for_post(post: &Post) -> Self {
        if post.is_news() {
            Route::NewsDetail(post.id)
        } else {
            Route::PostDetail(post.id)
        }
    }

    /// Login page that sends the user back to `next` afterwards.
    pub fn login_then(next: &str) -> String {
        format!("{}?next={}", Route::Login.path(), urlencoding::encode(next))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Accept only same-site absolute paths as redirect targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);
    local.then_some(next)
}
