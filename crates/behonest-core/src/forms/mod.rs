//! Form payloads and their validation rules.
//!
//! Forms deserialize straight from `application/x-www-form-urlencoded` bodies.
//! Missing fields become empty strings so that validation, not the extractor,
//! reports them.

mod errors;
mod login;
mod password;
mod registration;

pub use errors::FormErrors;
pub use login::{Credentials, LoginForm};
pub use password::{MIN_PASSWORD_LENGTH, validate_password};
pub use registration::{NewAccount, RegistrationForm, USERNAME_MAX_LENGTH};

pub(crate) const REQUIRED: &str = "This field is required.";
