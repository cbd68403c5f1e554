use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sales::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // Provider-supplied or synthetic; retried syncs collide here
                    .col(
                        ColumnDef::new(Sales::OrderId)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sales::ProductId).integer().not_null())
                    .col(ColumnDef::new(Sales::Platform).string_len(50).not_null())
                    .col(ColumnDef::new(Sales::CustomerEmail).string().null())
                    .col(ColumnDef::new(Sales::CustomerName).string().null())
                    .col(ColumnDef::new(Sales::Quantity).integer().not_null())
                    .col(ColumnDef::new(Sales::UnitPrice).decimal().not_null())
                    .col(ColumnDef::new(Sales::TotalAmount).decimal().not_null())
                    .col(ColumnDef::new(Sales::CostOfGoods).decimal().not_null())
                    .col(ColumnDef::new(Sales::GrossProfit).decimal().not_null())
                    .col(ColumnDef::new(Sales::Commission).decimal().not_null())
                    .col(ColumnDef::new(Sales::NetProfit).decimal().not_null())
                    .col(ColumnDef::new(Sales::OrderStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Sales::PaymentStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Sales::OrderDate).timestamp().not_null())
                    .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_product")
                            .from(Sales::Table, Sales::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Daily aggregation scans paid sales by order date
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_payment_status_order_date")
                    .table(Sales::Table)
                    .col(Sales::PaymentStatus)
                    .col(Sales::OrderDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    OrderId,
    ProductId,
    Platform,
    CustomerEmail,
    CustomerName,
    Quantity,
    UnitPrice,
    TotalAmount,
    CostOfGoods,
    GrossProfit,
    Commission,
    NetProfit,
    OrderStatus,
    PaymentStatus,
    OrderDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}
