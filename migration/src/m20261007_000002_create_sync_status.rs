use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per scheduled job; backs the automation status endpoint
        manager
            .create_table(
                Table::create()
                    .table(SyncStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncStatus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SyncStatus::JobName)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SyncStatus::LastSuccessAt).timestamp().null())
                    .col(ColumnDef::new(SyncStatus::LastAttemptAt).timestamp().null())
                    .col(ColumnDef::new(SyncStatus::LastError).text().null())
                    .col(ColumnDef::new(SyncStatus::LastDurationMs).big_integer().null())
                    .col(
                        ColumnDef::new(SyncStatus::SuccessCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncStatus::ErrorCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncStatus::MinIntervalSecs)
                            .integer()
                            .not_null()
                            .default(86400),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncStatus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SyncStatus {
    Table,
    Id,
    JobName,
    LastSuccessAt,
    LastAttemptAt,
    LastError,
    LastDurationMs,
    SuccessCount,
    ErrorCount,
    MinIntervalSecs,
}
