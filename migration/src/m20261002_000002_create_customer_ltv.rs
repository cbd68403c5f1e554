use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomerLtv::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerLtv::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerLtv::CustomerEmail)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CustomerLtv::CustomerName).string().null())
                    .col(
                        ColumnDef::new(CustomerLtv::TotalOrders)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CustomerLtv::TotalSpent)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CustomerLtv::TotalProfit)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CustomerLtv::AvgOrderValue)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CustomerLtv::LtvScore)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CustomerLtv::FirstPurchase).timestamp().not_null())
                    .col(ColumnDef::new(CustomerLtv::LastPurchase).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerLtv::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CustomerLtv {
    Table,
    Id,
    CustomerEmail,
    CustomerName,
    TotalOrders,
    TotalSpent,
    TotalProfit,
    AvgOrderValue,
    LtvScore,
    FirstPurchase,
    LastPurchase,
}
