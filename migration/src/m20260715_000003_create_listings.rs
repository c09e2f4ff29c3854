use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Listings::VehicleId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Listings::InvestorUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::BaseAmount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::BaseTermMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::BaseInstallment)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::AllowCounteroffers)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Listings::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending_docs"),
                    )
                    .col(
                        ColumnDef::new(Listings::AuctionStartsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::AuctionEndsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_investor_user_id")
                    .table(Listings::Table)
                    .col(Listings::InvestorUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Listings {
    Table,
    Id,
    VehicleId,
    InvestorUserId,
    BaseAmount,
    BaseTermMonths,
    BaseInstallment,
    AllowCounteroffers,
    Status,
    AuctionStartsAt,
    AuctionEndsAt,
    CreatedAt,
    UpdatedAt,
}
