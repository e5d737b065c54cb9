//! Server-rendered HTML pages.

mod auth;
mod error;
mod home;
mod layout;
mod posts;

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, Responder};
use maud::Markup;

pub use auth::{LoginPage, RegisterPage};
pub use error::error_page;
pub use home::home_page;
pub use layout::BaseLayout;
pub use posts::{PostDetailPage, PostListPage, PostSummary};

/// Template names. The layout stamps the name on `<body data-template>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Home,
    Register,
    Login,
    PostList,
    PostDetail,
    NewsDetail,
    Error,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Home => "main/home.html",
            Template::Register => "main/register.html",
            Template::Login => "main/login.html",
            Template::PostList => "post/post_list.html",
            Template::PostDetail => "post/post_detail.html",
            Template::NewsDetail => "post/news_detail.html",
            Template::Error => "error.html",
        }
    }
}

/// A rendered page together with the status it is served with.
pub struct Page {
    pub status: StatusCode,
    pub markup: Markup,
}

impl Page {
    pub fn ok(markup: Markup) -> Self {
        Self::with_status(StatusCode::OK, markup)
    }

    pub fn with_status(status: StatusCode, markup: Markup) -> Self {
        Self { status, markup }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status)
            .content_type(ContentType::html())
            .body(self.markup.into_string())
    }
}

impl Responder for Page {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_response()
    }
}
