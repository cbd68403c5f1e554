use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Per-user-type sales ledger, one row per recorded sale
        manager
            .create_table(
                Table::create()
                    .table(ProfitSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfitSplits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProfitSplits::UserType).string_len(16).not_null())
                    .col(ColumnDef::new(ProfitSplits::UserId).string().not_null())
                    .col(ColumnDef::new(ProfitSplits::OrderId).string_len(100).null())
                    .col(ColumnDef::new(ProfitSplits::ProductName).string().not_null())
                    .col(ColumnDef::new(ProfitSplits::Platform).string_len(50).not_null())
                    .col(ColumnDef::new(ProfitSplits::SalePrice).decimal().not_null())
                    .col(ColumnDef::new(ProfitSplits::Cost).decimal().not_null())
                    .col(ColumnDef::new(ProfitSplits::GrossProfit).decimal().not_null())
                    .col(ColumnDef::new(ProfitSplits::TeamShare).decimal().not_null())
                    .col(ColumnDef::new(ProfitSplits::UserProfit).decimal().not_null())
                    .col(
                        ColumnDef::new(ProfitSplits::ProfitSharePercentage)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfitSplits::RetainedPercentage)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProfitSplits::RecordedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profit_splits_user")
                    .table(ProfitSplits::Table)
                    .col(ProfitSplits::UserType)
                    .col(ProfitSplits::UserId)
                    .to_owned(),
            )
            .await?;

        // Single-row aggregate; only ever incremented
        manager
            .create_table(
                Table::create()
                    .table(TeamPool::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamPool::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeamPool::PoolTotal)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TeamPool::ContributionCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TeamPool::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamPoolContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamPoolContributions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeamPoolContributions::ContributorId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPoolContributions::SplitId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPoolContributions::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPoolContributions::ContributedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_pool_contributions_split")
                            .from(TeamPoolContributions::Table, TeamPoolContributions::SplitId)
                            .to(ProfitSplits::Table, ProfitSplits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_team_pool_contributions_contributor")
                    .table(TeamPoolContributions::Table)
                    .col(TeamPoolContributions::ContributorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamPoolContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamPool::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProfitSplits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProfitSplits {
    Table,
    Id,
    UserType,
    UserId,
    OrderId,
    ProductName,
    Platform,
    SalePrice,
    Cost,
    GrossProfit,
    TeamShare,
    UserProfit,
    ProfitSharePercentage,
    RetainedPercentage,
    RecordedAt,
}

#[derive(DeriveIden)]
enum TeamPool {
    Table,
    Id,
    PoolTotal,
    ContributionCount,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamPoolContributions {
    Table,
    Id,
    ContributorId,
    SplitId,
    Amount,
    ContributedAt,
}
