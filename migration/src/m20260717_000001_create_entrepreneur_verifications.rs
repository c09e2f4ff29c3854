use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntrepreneurVerifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::Dni)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::Phone)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::PhoneVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(EntrepreneurVerifications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(EntrepreneurVerifications::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum EntrepreneurVerifications {
    Table,
    UserId,
    Dni,
    Phone,
    PhoneVerified,
    Status,
    CreatedAt,
    UpdatedAt,
}
