use actix_web::http::StatusCode;
use maud::{Markup, html};

use super::{BaseLayout, Template};
use crate::urls::Route;

/// Error page. The session user is not resolved on error paths, so the nav
/// always renders in its anonymous form.
pub fn error_page(status: StatusCode, detail: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    let content = html! {
        h1 { (status.as_u16()) " " (title) }
        p { (detail) }
        p { a href=(Route::Homepage) { "Return to the homepage" } }
    };

    BaseLayout::new(title, Template::Error, None).render(content)
}
