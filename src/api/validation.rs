use super::ApiError;
use crate::domain::UserId;

pub fn validate_user_id(id: i32) -> Result<UserId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(UserId::new(id))
}

/// Both fields are required; the username is trimmed.
pub fn validate_credentials<'a>(
    username: &'a str,
    password: &str,
) -> Result<&'a str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id(1).is_ok());
        assert_eq!(validate_user_id(12).unwrap(), UserId::new(12));
        assert!(validate_user_id(0).is_err());
        assert!(validate_user_id(-1).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        assert_eq!(validate_credentials("  alice ", "pw").unwrap(), "alice");
        assert!(validate_credentials("", "pw").is_err());
        assert!(validate_credentials("   ", "pw").is_err());
        assert!(validate_credentials("alice", "").is_err());
    }
}
