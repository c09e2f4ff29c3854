use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Documents::VehicleId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::OwnerUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::DocType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::FilePath)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Documents::AdminNotes)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Documents::ReviewedBy)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Documents::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (vehicle, document type); submissions are upserts
        manager
            .create_index(
                Index::create()
                    .name("uq_documents_vehicle_doc_type")
                    .table(Documents::Table)
                    .col(Documents::VehicleId)
                    .col(Documents::DocType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_status")
                    .table(Documents::Table)
                    .col(Documents::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    VehicleId,
    OwnerUserId,
    DocType,
    FilePath,
    Status,
    AdminNotes,
    ReviewedBy,
    ReviewedAt,
    CreatedAt,
}
