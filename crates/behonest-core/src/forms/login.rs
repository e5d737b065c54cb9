use serde::{Deserialize, Serialize};

use super::{FormErrors, REQUIRED};

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Username and password ready to be checked against storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub const INVALID_LOGIN: &'static str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";
    pub const INACTIVE: &'static str = "This account is inactive.";

    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Credentials {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}
