//! Per-user workspace databases.
//!
//! Every account owns one SQLite file, named after its username, that holds
//! its application data. Provisioning is idempotent: an existing file is
//! opened and its schema brought up to date, never recreated.

mod migrator;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, Statement};
use sea_orm_migration::MigratorTrait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub use migrator::WorkspaceMigrator;

/// Creates (or reuses) the workspace database that belongs to a username.
#[async_trait]
pub trait WorkspaceProvisioner: Send + Sync {
    /// Returns the location of the workspace, creating it on first use.
    async fn ensure(&self, username: &str) -> Result<PathBuf>;
}

/// Workspaces stored as `<root>/<username>.db`.
///
/// Provisioning runs one workspace at a time: two callers opening the same
/// file would otherwise both apply the schema and collide on the migration
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct SqliteWorkspaces {
    root: PathBuf,
    provision_lock: Arc<Mutex<()>>,
}

impl SqliteWorkspaces {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            provision_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path_for(&self, username: &str) -> PathBuf {
        self.root.join(format!("{username}.db"))
    }
}

#[async_trait]
impl WorkspaceProvisioner for SqliteWorkspaces {
    async fn ensure(&self, username: &str) -> Result<PathBuf> {
        let _guard = self.provision_lock.lock().await;

        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create workspace root {}", self.root.display()))?;

        let path = self.path_for(username);
        let existed = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to inspect workspace {}", path.display()))?;

        let mut opt = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path.display()));
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to open workspace {}", path.display()))?;

        WorkspaceMigrator::up(&conn, None)
            .await
            .context("Failed to apply workspace schema")?;

        let backend = conn.get_database_backend();
        conn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT OR IGNORE INTO workspace_meta (key, value) VALUES (?, ?)",
            ["owner".into(), username.into()],
        ))
        .await
        .context("Failed to record workspace owner")?;

        if let Err(e) = conn.close().await {
            debug!(workspace = %path.display(), "Failed to close workspace connection: {e}");
        }

        if existed {
            debug!(workspace = %path.display(), "Reusing existing workspace");
        } else {
            debug!(workspace = %path.display(), "Created workspace");
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_path_is_named_after_user() {
        let workspaces = SqliteWorkspaces::new("/srv/tenantry/workspaces");
        assert_eq!(
            workspaces.path_for("alice"),
            PathBuf::from("/srv/tenantry/workspaces/alice.db")
        );
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let root = std::env::temp_dir().join(format!("tenantry-ws-{}", uuid::Uuid::new_v4()));
        let workspaces = SqliteWorkspaces::new(&root);

        let first = workspaces.ensure("alice").await.unwrap();
        let second = workspaces.ensure("alice").await.unwrap();

        assert_eq!(first, second);
        assert!(first.exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ensure_of_one_workspace_succeeds() {
        let root = std::env::temp_dir().join(format!("tenantry-ws-{}", uuid::Uuid::new_v4()));
        let workspaces = Arc::new(SqliteWorkspaces::new(&root));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let workspaces = workspaces.clone();
                tokio::spawn(async move { workspaces.ensure("bob").await })
            })
            .collect();

        for handle in handles {
            let path = handle.await.unwrap().unwrap();
            assert_eq!(path, root.join("bob.db"));
        }

        std::fs::remove_dir_all(&root).ok();
    }
}
