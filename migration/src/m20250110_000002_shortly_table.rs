use sea_orm_migration::prelude::*;

use super::m20250110_000001_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shortly::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shortly::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shortly::ShortCode).string().not_null())
                    .col(ColumnDef::new(Shortly::LongUrl).text().not_null())
                    .col(ColumnDef::new(Shortly::OwnerUserId).string_len(36).null())
                    .col(
                        ColumnDef::new(Shortly::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shortly::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shortly::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shortly_owner_user_id")
                            .from(Shortly::Table, Shortly::OwnerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The unique index is the only guard against two links sharing a code;
        // the minter relies on it instead of checking beforehand.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("unique_short_link")
                    .table(Shortly::Table)
                    .col(Shortly::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shortly_owner_user_id")
                    .table(Shortly::Table)
                    .col(Shortly::OwnerUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shortly_created_at")
                    .table(Shortly::Table)
                    .col(Shortly::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_shortly_created_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_shortly_owner_user_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("unique_short_link").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Shortly::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shortly {
    #[sea_orm(iden = "shortly")]
    Table,
    Id,
    ShortCode,
    LongUrl,
    OwnerUserId,
    CreatedAt,
    UpdatedAt,
    ClickCount,
}
