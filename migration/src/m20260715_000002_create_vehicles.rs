use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::OwnerUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Plate)
                            .string_len(16)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Make)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Model)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Year)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_owner_user_id")
                    .table(Vehicles::Table)
                    .col(Vehicles::OwnerUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
    OwnerUserId,
    Plate,
    Make,
    Model,
    Year,
    CreatedAt,
}
