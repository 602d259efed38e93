//! Domain service for authentication and account lifecycle.
//!
//! Owns every read and write of account identity data: bootstrap, creation,
//! credential checks, listing, blocking and deletion.

use thiserror::Error;

use crate::constants::limits::MAX_USERNAME_LEN;
use crate::db::User;
use crate::domain::UserId;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Unknown user, wrong password and blocked account all look the same.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Errors a user can act on, as opposed to infrastructure failures.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Usernames double as workspace file names, so they are restricted to a
/// portable character set.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation("Username cannot be empty".to_string()));
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::Validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }

    if username.starts_with('.') {
        return Err(AuthError::Validation(
            "Username cannot start with '.'".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AuthError::Validation(
            "Username can only contain letters, numbers, '.', '-' and '_'".to_string(),
        ));
    }

    Ok(())
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Ensures the bootstrap administrator exists and returns it.
    /// Safe to call any number of times.
    async fn initialize(&self) -> Result<User, AuthError>;

    /// Creates an account and provisions its workspace.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] if the name is taken and
    /// [`AuthError::Validation`] if it is not a valid username.
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, AuthError>;

    /// Verifies credentials and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user, a
    /// blocked account or a wrong password alike.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// All accounts, ordered by username.
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    /// Permanently removes an account. Unknown ids are a no-op.
    async fn delete_user(&self, id: UserId) -> Result<(), AuthError>;

    /// Flips the blocked flag. Returns `false` if the account does not exist.
    async fn toggle_block(&self, id: UserId) -> Result<bool, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith-2_x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(".hidden").is_err());
        assert!(validate_username("../etc").is_err());
        assert!(validate_username("a/b").is_err());
        assert!(validate_username("with space").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn infrastructure_errors_are_not_recoverable() {
        assert!(AuthError::DuplicateUsername("x".into()).is_recoverable());
        assert!(AuthError::Validation("x".into()).is_recoverable());
        assert!(!AuthError::Database("x".into()).is_recoverable());
        let db_err: AuthError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(db_err, AuthError::Database(_)));
    }
}
