use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountController, AuthService, SeaOrmAuthService};
use crate::workspace::{SqliteWorkspaces, WorkspaceProvisioner};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub accounts: AccountController,
}

impl SharedState {
    /// Connects the auth database, applies migrations and makes sure the
    /// bootstrap administrator exists.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let workspaces = Arc::new(SqliteWorkspaces::new(&config.workspace.root))
            as Arc<dyn WorkspaceProvisioner>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            workspaces,
            config.security.clone(),
            config.bootstrap.clone(),
        )) as Arc<dyn AuthService>;

        auth_service
            .initialize()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize auth store: {e}"))?;

        let accounts = AccountController::new(auth_service.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            accounts,
        })
    }
}
