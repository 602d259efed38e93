//! Domain types for account management with strong typing.
//!
//! Every comparison between a session identity and a target account goes
//! through [`UserId`], so a caller id can never be compared against a
//! differently-typed value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a user account.
///
/// # Examples
///
/// ```rust
/// use tenantry::domain::UserId;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self(id))
    }
}

/// The identity behind a request, as read from the session.
///
/// `admin_hint` mirrors the flag cached at login. It is only a rendering
/// hint: authorization always re-reads the account from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caller {
    pub user_id: Option<UserId>,
    pub admin_hint: bool,
}

impl Caller {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            admin_hint: false,
        }
    }

    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self {
            user_id: Some(id),
            admin_hint: false,
        }
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// True when `target` is the caller's own account.
    #[must_use]
    pub fn is_self(&self, target: UserId) -> bool {
        self.user_id == Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_conversions() {
        let id = UserId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(UserId::from(42), id);
    }

    #[test]
    fn user_id_serialization() {
        let id = UserId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn caller_self_detection() {
        let caller = Caller::user(UserId::new(3));
        assert!(caller.is_self(UserId::new(3)));
        assert!(!caller.is_self(UserId::new(4)));
        assert!(!Caller::anonymous().is_self(UserId::new(3)));
        assert!(Caller::anonymous().is_anonymous());
    }
}
