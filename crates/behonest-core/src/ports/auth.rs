//! Password hashing port.

/// One-way password hashing. Implementations are CPU bound; the web layer
/// calls them off the async workers.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password into a self-describing string (PHC format).
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password or an unreadable hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Hashing error: {0}")]
    HashingError(String),
}
