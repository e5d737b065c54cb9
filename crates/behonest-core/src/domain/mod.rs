//! Domain entities - the core business objects.

mod like;
mod post;
mod user;

pub use like::{Like, NewLike};
pub use post::{NewPost, Post, PostKind};
pub use user::User;
