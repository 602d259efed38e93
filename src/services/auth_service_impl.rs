//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{BootstrapConfig, SecurityConfig};
use crate::db::repositories::user::{hash_password_blocking, verify_password_blocking};
use crate::db::{InsertOutcome, NewUser, Store, User};
use crate::domain::UserId;
use crate::services::auth_service::{AuthError, AuthService, validate_username};
use crate::workspace::WorkspaceProvisioner;

/// Why a login was refused. Logged only, never returned.
#[derive(Debug, Clone, Copy)]
enum DenialReason {
    UnknownUser,
    Blocked,
    WrongPassword,
    MalformedHash,
}

pub struct SeaOrmAuthService {
    store: Store,
    workspaces: Arc<dyn WorkspaceProvisioner>,
    security: SecurityConfig,
    bootstrap: BootstrapConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        workspaces: Arc<dyn WorkspaceProvisioner>,
        security: SecurityConfig,
        bootstrap: BootstrapConfig,
    ) -> Self {
        Self {
            store,
            workspaces,
            security,
            bootstrap,
        }
    }

    async fn insert(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<InsertOutcome, AuthError> {
        validate_username(username)?;

        let db_path = self.workspaces.ensure(username).await?;
        let password_hash = hash_password_blocking(password, &self.security).await?;

        let outcome = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
                db_path: db_path.to_string_lossy().into_owned(),
                is_admin,
            })
            .await?;

        Ok(outcome)
    }

    fn deny(username: &str, reason: DenialReason) -> AuthError {
        match reason {
            DenialReason::MalformedHash => {
                warn!(username, ?reason, "Login refused");
            }
            DenialReason::Blocked => {
                info!(username, ?reason, "Login refused");
            }
            DenialReason::UnknownUser | DenialReason::WrongPassword => {
                debug!(username, ?reason, "Login refused");
            }
        }
        AuthError::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn initialize(&self) -> Result<User, AuthError> {
        let username = self.bootstrap.admin_username.as_str();

        if let Some(admin) = self.store.get_user_by_username(username).await? {
            return Ok(admin);
        }

        match self
            .insert(username, &self.bootstrap.admin_password, true)
            .await?
        {
            InsertOutcome::Created(admin) => {
                info!("Admin user '{}' created", admin.username);
                Ok(admin)
            }
            // Another initializer won the race.
            InsertOutcome::DuplicateUsername => self
                .store
                .get_user_by_username(username)
                .await?
                .ok_or(AuthError::UserNotFound),
        }
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        match self.insert(username, password, is_admin).await? {
            InsertOutcome::Created(user) => {
                info!(user_id = %user.id, "Created user '{}'", user.username);
                Ok(user)
            }
            InsertOutcome::DuplicateUsername => {
                Err(AuthError::DuplicateUsername(username.to_string()))
            }
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
        else {
            return Err(Self::deny(username, DenialReason::UnknownUser));
        };

        if user.is_blocked {
            return Err(Self::deny(username, DenialReason::Blocked));
        }

        match verify_password_blocking(password, password_hash).await {
            Ok(true) => Ok(user),
            Ok(false) => Err(Self::deny(username, DenialReason::WrongPassword)),
            Err(e) => {
                debug!("Password verification error: {e}");
                Err(Self::deny(username, DenialReason::MalformedHash))
            }
        }
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(id).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users().await?)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), AuthError> {
        if self.store.delete_user(id).await? {
            info!(user_id = %id, "Deleted user");
        } else {
            debug!(user_id = %id, "Delete requested for unknown user");
        }
        Ok(())
    }

    async fn toggle_block(&self, id: UserId) -> Result<bool, AuthError> {
        let found = self.store.toggle_user_blocked(id).await?;
        if found {
            info!(user_id = %id, "Toggled user block");
        } else {
            debug!(user_id = %id, "Block toggle requested for unknown user");
        }
        Ok(found)
    }
}
