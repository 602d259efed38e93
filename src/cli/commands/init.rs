//! Init command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_init(config: Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
    }

    let admin_username = config.bootstrap.admin_username.clone();
    let state = SharedState::new(config).await?;
    let users = state.store.list_users().await?;

    println!("Auth database ready ({} users).", users.len());
    println!("Administrator account: {admin_username}");

    Ok(())
}
