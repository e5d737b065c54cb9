use maud::{Markup, html};

use behonest_core::domain::User;

use super::posts::post_card;
use super::{BaseLayout, PostSummary, Template};
use crate::urls::Route;

/// Landing page with the most recent posts.
pub fn home_page(user: Option<&User>, recent: &[PostSummary<'_>]) -> Markup {
    let content = html! {
        section class="hero" {
            h1 { "BeHonest" }
            @match user {
                Some(user) => {
                    p { "Welcome back, " (user.username) "." }
                }
                None => {
                    p {
                        a href=(Route::Register) { "Create an account" }
                        " or "
                        a href=(Route::Login) { "log in" }
                        " to like posts."
                    }
                }
            }
        }
        section {
            h2 { "Latest" }
            @if recent.is_empty() {
                p { "Nothing has been posted yet." }
            }
            @for summary in recent {
                (post_card(summary))
            }
            p { a href=(Route::PostList) { "All posts" } }
        }
    };

    BaseLayout::new("Home", Template::Home, user).render(content)
}
