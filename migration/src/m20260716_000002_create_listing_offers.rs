use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ListingOffers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingOffers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::ListingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::EntrepreneurUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::CommissionAmount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::Message)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(ListingOffers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // One commission bid per entrepreneur per listing; re-bids are upserts
        manager
            .create_index(
                Index::create()
                    .name("uq_listing_offers_listing_entrepreneur")
                    .table(ListingOffers::Table)
                    .col(ListingOffers::ListingId)
                    .col(ListingOffers::EntrepreneurUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listing_offers_listing_id")
                    .table(ListingOffers::Table)
                    .col(ListingOffers::ListingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ListingOffers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ListingOffers {
    Table,
    Id,
    ListingId,
    EntrepreneurUserId,
    CommissionAmount,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}
