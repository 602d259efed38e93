use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::UserId;
use crate::entities::users;

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub db_path: String,
    pub created_at: i64,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            username: model.username,
            db_path: model.db_path,
            created_at: model.created_at,
            is_admin: model.is_admin,
            is_blocked: model.is_blocked,
        }
    }
}

/// Fields for a new account row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub db_path: String,
    pub is_admin: bool,
}

/// Result of an insert that may collide with the username constraint.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Created(User),
    DuplicateUsername,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user.
    ///
    /// Uniqueness is left to the table constraint so two concurrent inserts
    /// for the same name resolve to exactly one row.
    pub async fn insert(&self, new_user: NewUser) -> Result<InsertOutcome> {
        let active = users::ActiveModel {
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            db_path: Set(new_user.db_path),
            created_at: Set(chrono::Utc::now().timestamp()),
            is_admin: Set(new_user.is_admin),
            is_blocked: Set(false),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(InsertOutcome::Created(User::from(model))),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Ok(InsertOutcome::DuplicateUsername)
                } else {
                    Err(err).context("Failed to insert user")
                }
            }
        }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username with password hash (for credential checks)
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// All users, ordered by username
    pub async fn list(&self) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    /// Hard delete. Returns whether a row was removed.
    pub async fn delete(&self, id: UserId) -> Result<bool> {
        let result = users::Entity::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    /// Flip `is_blocked` in a single statement. Returns whether the user exists.
    pub async fn toggle_blocked(&self, id: UserId) -> Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::IsBlocked,
                Expr::col(users::Column::IsBlocked).not(),
            )
            .filter(users::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to toggle user block")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash. The params are read from the
/// hash itself, so hashes made with older settings keep verifying.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash on a blocking thread; Argon2 is CPU-intensive.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

/// Verify on a blocking thread; Argon2 is CPU-intensive.
pub async fn verify_password_blocking(password: &str, password_hash: String) -> Result<bool> {
    let password = password.to_string();
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("secret123", Some(&fast_config())).unwrap();
        assert_ne!(hash, "secret123");
        assert!(!hash.contains("secret123"));
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("secret124", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("frost", Some(&fast_config())).unwrap();
        let b = hash_password("frost", Some(&fast_config())).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
