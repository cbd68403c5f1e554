use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AutomationRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AutomationRuns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AutomationRuns::RunType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AutomationRuns::ItemsProcessed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AutomationRuns::DurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AutomationRuns::Success).boolean().not_null())
                    .col(ColumnDef::new(AutomationRuns::Error).text().null())
                    .col(ColumnDef::new(AutomationRuns::StartedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_automation_runs_type_started")
                    .table(AutomationRuns::Table)
                    .col(AutomationRuns::RunType)
                    .col(AutomationRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AutomationRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AutomationRuns {
    Table,
    Id,
    RunType,
    ItemsProcessed,
    DurationMs,
    Success,
    Error,
    StartedAt,
}
