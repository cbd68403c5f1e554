use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Products::Sku)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Title).string().not_null())
                    .col(
                        ColumnDef::new(Products::Category)
                            .string_len(32)
                            .not_null()
                            .default("general"),
                    )
                    .col(ColumnDef::new(Products::Niche).string().not_null())
                    .col(ColumnDef::new(Products::BasePrice).decimal().not_null())
                    .col(ColumnDef::new(Products::SellingPrice).decimal().not_null())
                    .col(ColumnDef::new(Products::ProfitMargin).decimal().not_null())
                    .col(
                        ColumnDef::new(Products::TrendScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_status")
                    .table(Products::Table)
                    .col(Products::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_niche")
                    .table(Products::Table)
                    .col(Products::Niche)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Sku,
    Title,
    Category,
    Niche,
    BasePrice,
    SellingPrice,
    ProfitMargin,
    TrendScore,
    Status,
    CreatedAt,
}
