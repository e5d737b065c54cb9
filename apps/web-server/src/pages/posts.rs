//! Post list, post detail and news detail pages.

use maud::{Markup, PreEscaped, html};

use behonest_core::domain::{Post, User};

use super::{BaseLayout, Template};
use crate::urls::Route;

const EXCERPT_CHARS: usize = 280;

/// Sends the like form with fetch and updates the counter in place.
/// Without JavaScript the form posts normally and the server redirects back.
const LIKE_SCRIPT: &str = r#"document.querySelectorAll('form[data-like]').forEach(function (form) {
    form.addEventListener('submit', function (event) {
        event.preventDefault();
        fetch(form.action, {
            method: 'POST',
            credentials: 'same-origin',
            headers: { 'X-Requested-With': 'XMLHttpRequest', 'Accept': 'application/json' }
        })
            .then(function (res) { return res.json(); })
            .then(function (body) {
                if (!body.success) { return; }
                form.querySelector('[data-likes]').textContent = body.data.likes;
                form.querySelector('button').textContent = body.data.liked ? 'Unlike' : 'Like';
            });
    });
});"#;

/// A post as shown in listings.
pub struct PostSummary<'a> {
    pub post: &'a Post,
    pub likes: u64,
}

/// One page of the post listing.
pub struct PostListPage<'a> {
    pub posts: Vec<PostSummary<'a>>,
    pub page: u64,
    pub num_pages: u64,
}

impl PostListPage<'_> {
    pub fn render(&self, user: Option<&User>) -> Markup {
        let content = html! {
            h1 { "Posts" }
            @if self.posts.is_empty() {
                p { "Nothing has been posted yet." }
            } @else {
                @for summary in &self.posts {
                    (post_card(summary))
                }
                (self.render_pagination())
            }
        };

        BaseLayout::new("Posts", Template::PostList, user).render(content)
    }

    fn render_pagination(&self) -> Markup {
        if self.num_pages <= 1 {
            return html! {};
        }
        let base = Route::PostList.path();
        html! {
            nav class="pagination" aria-label="Pagination" {
                @if self.page > 1 {
                    a href={ (base) "?page=" (self.page - 1) } rel="prev" { "Previous" }
                }
                span { "Page " (self.page) " of " (self.num_pages) }
                @if self.page < self.num_pages {
                    a href={ (base) "?page=" (self.page + 1) } rel="next" { "Next" }
                }
            }
        }
    }
}

/// Card used by the listing and the homepage.
pub(super) fn post_card(summary: &PostSummary<'_>) -> Markup {
    let post = summary.post;
    html! {
        article class="post-card" data-post-id=(post.id) {
            header {
                @if post.is_news() {
                    span class="badge" { "News" }
                    " "
                }
                a href=(Route::for_post(post)) { (post.title) }
            }
            p { (post.excerpt(EXCERPT_CHARS)) }
            footer {
                small {
                    (post.created_at.format("%B %-d, %Y"))
                    " · " (summary.likes) " "
                    @if summary.likes == 1 { "like" } @else { "likes" }
                }
            }
        }
    }
}

/// Detail view of a single post or news item.
pub struct PostDetailPage<'a> {
    pub post: &'a Post,
    pub likes: u64,
    /// Whether the current user has liked the post.
    pub liked: bool,
}

impl PostDetailPage<'_> {
    pub fn render(&self, user: Option<&User>) -> Markup {
        let template = if self.post.is_news() {
            Template::NewsDetail
        } else {
            Template::PostDetail
        };

        let content = html! {
            article data-post-id=(self.post.id) {
                header {
                    @if self.post.is_news() {
                        span class="badge" { "News" }
                    }
                    h1 { (self.post.title) }
                    small { "Published " (self.post.created_at.format("%B %-d, %Y %H:%M")) }
                }
                @for paragraph in self.post.body.split("\n\n") {
                    p { (paragraph) }
                }
                footer {
                    form method="post" action=(Route::LikePost(self.post.id)) data-like {
                        button type="submit" {
                            @if self.liked { "Unlike" } @else { "Like" }
                        }
                        " "
                        span data-likes { (self.likes) }
                    }
                    @if user.is_none() {
                        small {
                            a href=(Route::login_then(&Route::for_post(self.post).path())) { "Log in" }
                            " to like this post."
                        }
                    }
                }
            }
            p { a href=(Route::PostList) { "Back to all posts" } }
            script { (PreEscaped(LIKE_SCRIPT)) }
        };

        BaseLayout::new(&self.post.title, template, user).render(content)
    }
}
