use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhoneOtps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhoneOtps::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PhoneOtps::Phone)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhoneOtps::Code)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhoneOtps::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhoneOtps::Consumed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PhoneOtps::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_phone_otps_phone")
                    .table(PhoneOtps::Table)
                    .col(PhoneOtps::Phone)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PhoneOtps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PhoneOtps {
    Table,
    Id,
    Phone,
    Code,
    ExpiresAt,
    Consumed,
    CreatedAt,
}
