use super::m20230501_000001_create_users::Users;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20230508_000008_create_reset_password_tokens"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResetPasswordTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResetPasswordTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResetPasswordTokens::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ResetPasswordTokens::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ResetPasswordTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResetPasswordTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reset_password_tokens-user_id")
                            .from(ResetPasswordTokens::Table, ResetPasswordTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResetPasswordTokens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ResetPasswordTokens {
    Table,
    Id,
    Token,
    UserId,
    CreatedAt,
    ExpiresAt,
}
