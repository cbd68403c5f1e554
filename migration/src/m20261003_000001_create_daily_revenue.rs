use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Materialized rollup of paid sales, rewritten whole on every aggregation
        manager
            .create_table(
                Table::create()
                    .table(DailyRevenue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyRevenue::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyRevenue::Date)
                            .date()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DailyRevenue::TotalSales).decimal().not_null())
                    .col(ColumnDef::new(DailyRevenue::TotalOrders).integer().not_null())
                    .col(ColumnDef::new(DailyRevenue::TotalCost).decimal().not_null())
                    .col(ColumnDef::new(DailyRevenue::TotalProfit).decimal().not_null())
                    .col(ColumnDef::new(DailyRevenue::AvgOrderValue).decimal().not_null())
                    .col(ColumnDef::new(DailyRevenue::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyRevenue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyRevenue {
    Table,
    Id,
    Date,
    TotalSales,
    TotalOrders,
    TotalCost,
    TotalProfit,
    AvgOrderValue,
    UpdatedAt,
}
