//! User management command handlers

use chrono::{TimeZone, Utc};

use crate::config::Config;
use crate::domain::UserId;
use crate::services::AuthError;
use crate::state::SharedState;

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0).single().map_or_else(
        || ts.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

pub async fn cmd_users_list(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let users = state.auth_service.list_users().await?;

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        let status = if user.is_blocked { "blocked" } else { "active" };
        println!(
            "{:>4}  {:<24} {:<6} {:<8} {}",
            user.id,
            user.username,
            role,
            status,
            format_timestamp(user.created_at)
        );
    }

    Ok(())
}

pub async fn cmd_users_add(
    config: Config,
    username: &str,
    password: &str,
    admin: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    match state
        .auth_service
        .create_user(username.trim(), password, admin)
        .await
    {
        Ok(user) => {
            println!("✓ Created user '{}' (ID: {})", user.username, user.id);
            println!("  Workspace: {}", user.db_path);
            Ok(())
        }
        Err(e @ (AuthError::DuplicateUsername(_) | AuthError::Validation(_))) => {
            println!("✗ {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_users_block(config: Config, id: i32) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let id = UserId::new(id);

    if !state.auth_service.toggle_block(id).await? {
        println!("User {id} not found");
        return Ok(());
    }

    if let Some(user) = state.auth_service.get_user(id).await? {
        let status = if user.is_blocked { "blocked" } else { "unblocked" };
        println!("✓ User '{}' is now {status}", user.username);
    }

    Ok(())
}

pub async fn cmd_users_remove(config: Config, id: i32) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let id = UserId::new(id);

    let Some(user) = state.auth_service.get_user(id).await? else {
        println!("User {id} not found");
        return Ok(());
    };

    state.auth_service.delete_user(id).await?;
    println!("✓ Deleted user '{}'", user.username);
    println!("  Workspace left in place: {}", user.db_path);

    Ok(())
}
