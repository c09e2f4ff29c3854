use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Counteroffers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Counteroffers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::ListingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::EntrepreneurUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::TermMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::Installment)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Counteroffers::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_counteroffers_listing_id")
                    .table(Counteroffers::Table)
                    .col(Counteroffers::ListingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Counteroffers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Counteroffers {
    Table,
    Id,
    ListingId,
    EntrepreneurUserId,
    Amount,
    TermMonths,
    Installment,
    Status,
    CreatedAt,
}
