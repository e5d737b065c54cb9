//! Password policy applied to new passwords.

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Attributes shorter than this are not compared against the password.
const MIN_SIMILARITY_LENGTH: usize = 3;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "1234567890", "password", "password1",
    "password123", "qwerty", "qwerty123", "qwertyuiop", "abc123", "abcd1234",
    "111111", "000000", "1q2w3e4r", "1q2w3e4r5t", "iloveyou", "admin", "admin123",
    "welcome", "welcome1", "letmein", "monkey", "dragon", "football", "baseball",
    "sunshine", "princess", "superman", "starwars", "trustno1", "passw0rd",
    "master", "shadow", "michael", "jennifer", "zaq12wsx", "asdfghjkl",
    "changeme", "secret123",
];

/// Check a candidate password, returning every policy message it violates.
///
/// `username` and `email` are compared against the password so that users
/// cannot pick a password that is just their account name.
pub fn validate_password(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut messages = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        messages.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    let lowered = password.to_lowercase();

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        messages.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        messages.push("This password is entirely numeric.".to_string());
    }

    let email_local = email.split('@').next().unwrap_or_default();
    for (attribute, label) in [(username, "username"), (email_local, "email address")] {
        if too_similar(&lowered, &attribute.to_lowercase()) {
            messages.push(format!("The password is too similar to the {label}."));
        }
    }

    messages
}

fn too_similar(password: &str, attribute: &str) -> bool {
    if attribute.chars().count() < MIN_SIMILARITY_LENGTH
        || password.chars().count() < MIN_SIMILARITY_LENGTH
    {
        return false;
    }
    password.contains(attribute) || attribute.contains(password)
}
