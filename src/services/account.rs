//! Account page controller.
//!
//! Turns a caller identity into account views and admin actions. Every
//! operation takes the caller explicitly and re-reads the caller's account
//! from the store before authorizing, so a flag cached in the session or a
//! previous render never grants access. Mutating actions answer with the full
//! re-queried user list.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::constants::routes;
use crate::db::User;
use crate::domain::{Caller, UserId};
use crate::services::auth_service::{AuthError, AuthService};

pub const MSG_NOT_LOGGED_IN: &str = "You are not logged in.";
pub const MSG_ACCESS_DENIED: &str = "Access denied.";
pub const MSG_MISSING_FIELDS: &str = "Please provide username and password.";

/// A user as shown in the admin panel. Never carries the password hash or
/// the workspace location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub created_at: i64,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            is_admin: user.is_admin,
            is_blocked: user.is_blocked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    User,
}

/// The caller's own account information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub created_at: i64,
    pub role: Role,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
            role: if user.is_admin {
                Role::Administrator
            } else {
                Role::User
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccountView {
    /// No session: only a login prompt.
    Anonymous { login: String },
    /// The session refers to an account that no longer exists.
    UnknownUser { login: String },
    Member { profile: Profile },
    Admin {
        profile: Profile,
        users: Vec<UserSummary>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub redirect: String,
}

/// Result of the create-user form. Field values are echoed back: cleared on
/// success, preserved on failure so the admin can correct them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserOutcome {
    pub message: String,
    pub username: String,
    pub password: String,
    pub users: Vec<UserSummary>,
}

/// Typed UI action payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AccountAction {
    Refresh,
    Logout,
    Create { username: String, password: String },
    Block { target_id: UserId },
    Delete { target_id: UserId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Users { users: Vec<UserSummary> },
    Created(CreateUserOutcome),
    Navigate(Navigation),
}

#[derive(Clone)]
pub struct AccountController {
    auth: Arc<dyn AuthService>,
}

impl AccountController {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self { auth }
    }

    /// Fresh read of the caller's account, if it is an active admin.
    async fn current_admin(&self, caller: &Caller) -> Result<Option<User>, AuthError> {
        let Some(id) = caller.user_id else {
            return Ok(None);
        };

        let user = self.auth.get_user(id).await?;
        let is_active_admin = user.as_ref().is_some_and(|u| u.is_admin && !u.is_blocked);
        if caller.admin_hint != is_active_admin {
            debug!(user_id = %id, hint = caller.admin_hint, "Session admin flag is stale");
        }
        Ok(user.filter(|_| is_active_admin))
    }

    async fn summaries(&self) -> Result<Vec<UserSummary>, AuthError> {
        Ok(self
            .auth
            .list_users()
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    pub async fn view(&self, caller: &Caller) -> Result<AccountView, AuthError> {
        let Some(id) = caller.user_id else {
            return Ok(AccountView::Anonymous {
                login: routes::LOGIN.to_string(),
            });
        };

        let Some(user) = self.auth.get_user(id).await? else {
            return Ok(AccountView::UnknownUser {
                login: routes::LOGIN.to_string(),
            });
        };

        let profile = Profile::from(&user);
        if user.is_admin && !user.is_blocked {
            Ok(AccountView::Admin {
                profile,
                users: self.summaries().await?,
            })
        } else {
            Ok(AccountView::Member { profile })
        }
    }

    /// The session itself is cleared by the HTTP layer.
    pub fn logout(&self, caller: &Caller) -> Navigation {
        if let Some(id) = caller.user_id {
            info!(user_id = %id, "User logged out");
        }
        Navigation {
            redirect: routes::LOGIN.to_string(),
        }
    }

    pub async fn refresh_user_list(&self, caller: &Caller) -> Result<Vec<UserSummary>, AuthError> {
        if self.current_admin(caller).await?.is_none() {
            return Ok(Vec::new());
        }
        self.summaries().await
    }

    pub async fn create_user_action(
        &self,
        caller: &Caller,
        username: &str,
        password: &str,
    ) -> Result<CreateUserOutcome, AuthError> {
        if caller.is_anonymous() {
            return Ok(rejected(MSG_NOT_LOGGED_IN));
        }

        let Some(admin) = self.current_admin(caller).await? else {
            return Ok(rejected(MSG_ACCESS_DENIED));
        };

        let trimmed = username.trim();
        if trimmed.is_empty() || password.is_empty() {
            return Ok(CreateUserOutcome {
                message: MSG_MISSING_FIELDS.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                users: self.summaries().await?,
            });
        }

        match self.auth.create_user(trimmed, password, false).await {
            Ok(user) => {
                info!(admin_id = %admin.id, user_id = %user.id, "Admin created user");
                Ok(CreateUserOutcome {
                    message: format!("User '{}' created successfully.", user.username),
                    username: String::new(),
                    password: String::new(),
                    users: self.summaries().await?,
                })
            }
            Err(e) => {
                let message = if e.is_recoverable() {
                    format!("Error: {e}")
                } else {
                    error!("Failed to create user '{trimmed}': {e}");
                    "Error: the user could not be created.".to_string()
                };
                Ok(CreateUserOutcome {
                    message,
                    username: username.to_string(),
                    password: password.to_string(),
                    users: self.summaries().await?,
                })
            }
        }
    }

    pub async fn toggle_block_action(
        &self,
        caller: &Caller,
        target_id: UserId,
    ) -> Result<Vec<UserSummary>, AuthError> {
        let Some(admin) = self.current_admin(caller).await? else {
            debug!(target_id = %target_id, "Ignoring block request from non-admin");
            return Ok(Vec::new());
        };

        if caller.is_self(target_id) {
            warn!(user_id = %admin.id, "Admin attempted to block own account");
        } else {
            self.auth.toggle_block(target_id).await?;
        }

        self.summaries().await
    }

    pub async fn delete_user_action(
        &self,
        caller: &Caller,
        target_id: UserId,
    ) -> Result<Vec<UserSummary>, AuthError> {
        let Some(admin) = self.current_admin(caller).await? else {
            debug!(target_id = %target_id, "Ignoring delete request from non-admin");
            return Ok(Vec::new());
        };

        if caller.is_self(target_id) {
            warn!(user_id = %admin.id, "Admin attempted to delete own account");
        } else {
            self.auth.delete_user(target_id).await?;
        }

        self.summaries().await
    }

    pub async fn dispatch(
        &self,
        caller: &Caller,
        action: AccountAction,
    ) -> Result<ActionOutcome, AuthError> {
        match action {
            AccountAction::Refresh => Ok(ActionOutcome::Users {
                users: self.refresh_user_list(caller).await?,
            }),
            AccountAction::Logout => Ok(ActionOutcome::Navigate(self.logout(caller))),
            AccountAction::Create { username, password } => Ok(ActionOutcome::Created(
                self.create_user_action(caller, &username, &password)
                    .await?,
            )),
            AccountAction::Block { target_id } => Ok(ActionOutcome::Users {
                users: self.toggle_block_action(caller, target_id).await?,
            }),
            AccountAction::Delete { target_id } => Ok(ActionOutcome::Users {
                users: self.delete_user_action(caller, target_id).await?,
            }),
        }
    }
}

fn rejected(message: &str) -> CreateUserOutcome {
    CreateUserOutcome {
        message: message.to_string(),
        username: String::new(),
        password: String::new(),
        users: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_hides_sensitive_fields() {
        let user = User {
            id: UserId::new(1),
            username: "alice".to_string(),
            db_path: "user_dbs/alice.db".to_string(),
            created_at: 1_700_000_000,
            is_admin: false,
            is_blocked: false,
        };
        let json = serde_json::to_value(UserSummary::from(user)).unwrap();
        assert!(json.get("db_path").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn action_payload_is_typed() {
        let action: AccountAction =
            serde_json::from_str(r#"{"action":"block","target_id":5}"#).unwrap();
        assert_eq!(
            action,
            AccountAction::Block {
                target_id: UserId::new(5)
            }
        );

        let action: AccountAction = serde_json::from_str(r#"{"action":"logout"}"#).unwrap();
        assert_eq!(action, AccountAction::Logout);

        assert!(serde_json::from_str::<AccountAction>(r#"{"action":"block","target_id":"5"}"#).is_err());
    }

    #[test]
    fn view_is_tagged_by_state() {
        let view = AccountView::Anonymous {
            login: "/login".to_string(),
        };
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["state"], "anonymous");
        assert_eq!(json["login"], "/login");
    }
}
