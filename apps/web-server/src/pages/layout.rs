//! Base layout shared by every page.

use maud::{DOCTYPE, Markup, html};

use behonest_core::domain::User;

use super::Template;
use crate::urls::Route;

const SITE_NAME: &str = "BeHonest";

/// Page skeleton with navigation that reflects the session user.
///
/// ```ignore
/// let markup = BaseLayout::new("Login", Template::Login, user.as_ref())
///     .render(html! { h1 { "Log in" } });
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    template: Template,
    user: Option<&'a User>,
}

impl<'a> BaseLayout<'a> {
    #[must_use]
    pub fn new(title: &'a str, template: Template, user: Option<&'a User>) -> Self {
        Self {
            title,
            template,
            user,
        }
    }

    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (self.title) " - " (SITE_NAME) }
                }
                body data-template=(self.template.name()) {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    footer class="container" {
                        small { (SITE_NAME) }
                    }
                }
            }
        }
    }

    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li { a href=(Route::Homepage) { strong { (SITE_NAME) } } }
                        li { a href=(Route::PostList) { "Posts" } }
                    }
                    ul {
                        @if let Some(user) = self.user {
                            li { "Signed in as " strong { (user.username) } }
                            li {
                                form method="post" action=(Route::Logout) {
                                    button type="submit" class="link" { "Log out" }
                                }
                            }
                        } @else {
                            li { a href=(Route::Login) { "Log in" } }
                            li { a href=(Route::Register) { "Register" } }
                        }
                    }
                }
            }
        }
    }
}
