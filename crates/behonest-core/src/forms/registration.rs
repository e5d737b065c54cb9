use serde::{Deserialize, Serialize};

use super::{FormErrors, REQUIRED, validate_password};

pub const USERNAME_MAX_LENGTH: usize = 150;

const USERNAME_CHARSET: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// Sign-up form: a username, an email and the password typed twice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// The cleaned result of a valid registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Clean every field and collect all problems in one pass.
    pub fn validate(&self) -> Result<NewAccount, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else {
            if username.chars().count() > USERNAME_MAX_LENGTH {
                errors.add(
                    "username",
                    format!(
                        "Ensure this value has at most {USERNAME_MAX_LENGTH} characters (it has {}).",
                        username.chars().count()
                    ),
                );
            }
            if !username.chars().all(is_username_char) {
                errors.add("username", USERNAME_CHARSET);
            }
        }

        let email = normalize_email(self.email.trim());
        if email.is_empty() {
            errors.add("email", REQUIRED);
        } else if !is_valid_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn’t match.");
            } else {
                for message in validate_password(&self.password1, username, &email) {
                    errors.add("password2", message);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewAccount {
            username: username.to_string(),
            email,
            password: self.password1.clone(),
        })
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Lower-case the domain part; the local part is left as typed.
fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "testuser3".to_string(),
            email: "testemail@gmail.com".to_string(),
            password1: "UncxYv234zzy".to_string(),
            password2: "UncxYv234zzy".to_string(),
        }
    }

    #[test]
    fn test_valid_sample_is_accepted() {
        let account = valid_form().validate().unwrap();
        assert_eq!(account.username, "testuser3");
        assert_eq!(account.email, "testemail@gmail.com");
        assert_eq!(account.password, "UncxYv234zzy");
    }

    #[test]
    fn test_invalid_sample_is_rejected() {
        let form = RegistrationForm {
            username: String::new(),
            email: "testemail@gmail.com".to_string(),
            password1: "pwd".to_string(),
            password2: "pwd".to_string(),
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("username"), ["This field is required."]);
        assert!(errors.field("password2")[0].contains("too short"));
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_mismatched_passwords() {
        let form = RegistrationForm {
            password2: "UncxYv234zzZ".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("password2"), ["The two password fields didn’t match."]);
    }

    #[test]
    fn test_missing_fields_are_required() {
        let errors = RegistrationForm::default().validate().unwrap_err();
        for field in ["username", "email", "password1", "password2"] {
            assert_eq!(errors.field(field), ["This field is required."], "{field}");
        }
    }

    #[test]
    fn test_username_rules() {
        let form = RegistrationForm {
            username: "bad name!".to_string(),
            ..valid_form()
        };
        assert!(form.validate().unwrap_err().has("username"));

        let form = RegistrationForm {
            username: "a".repeat(USERNAME_MAX_LENGTH + 1),
            ..valid_form()
        };
        assert!(form.validate().unwrap_err().field("username")[0].contains("at most 150"));

        let form = RegistrationForm {
            username: "  jane.doe+blog@home  ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().username, "jane.doe+blog@home");
    }

    #[test]
    fn test_email_rules() {
        for bad in ["nope", "@gmail.com", "a@b", "a b@c.com", "a@b..com"] {
            let form = RegistrationForm {
                email: bad.to_string(),
                ..valid_form()
            };
            assert!(form.validate().unwrap_err().has("email"), "{bad}");
        }

        let form = RegistrationForm {
            email: "Jane@Example.COM".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().email, "Jane@example.com");
    }
}
