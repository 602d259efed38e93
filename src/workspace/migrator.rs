use sea_orm_migration::prelude::*;

pub struct WorkspaceMigrator;

#[async_trait::async_trait]
impl MigratorTrait for WorkspaceMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateWorkspaceMeta)]
    }
}

#[derive(DeriveMigrationName)]
struct CreateWorkspaceMeta;

#[async_trait::async_trait]
impl MigrationTrait for CreateWorkspaceMeta {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceMeta::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkspaceMeta::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkspaceMeta::Value).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkspaceMeta::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WorkspaceMeta {
    Table,
    Key,
    Value,
}
