use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Niches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Niches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Niches::Keyword)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Niches::SearchVolume)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Niches::CompetitionLevel)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Niches::TrendDirection)
                            .string_len(16)
                            .not_null()
                            .default("rising"),
                    )
                    .col(
                        ColumnDef::new(Niches::ProfitPotential)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Niches::ProductsCreated)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Niches::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Niches::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Niches::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Product selection reads active niches by potential, then volume
        manager
            .create_index(
                Index::create()
                    .name("idx_niches_status_potential")
                    .table(Niches::Table)
                    .col(Niches::Status)
                    .col(Niches::ProfitPotential)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Niches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Niches {
    Table,
    Id,
    Keyword,
    SearchVolume,
    CompetitionLevel,
    TrendDirection,
    ProfitPotential,
    ProductsCreated,
    Status,
    CreatedAt,
    UpdatedAt,
}
