use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create identities table
        manager
            .create_table(
                Table::create()
                    .table(Identities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Identities::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Identities::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Identities::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Identities::FullName).string().not_null())
                    .col(ColumnDef::new(Identities::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Identities::Role).string().not_null())
                    .col(ColumnDef::new(Identities::Enabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(Identities::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Identities::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create reset_tokens table
        manager
            .create_table(
                Table::create()
                    .table(ResetTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResetTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResetTokens::Token).string().not_null().unique_key())
                    .col(ColumnDef::new(ResetTokens::IdentityId).string().not_null())
                    .col(ColumnDef::new(ResetTokens::ExpiresAt).big_integer().not_null())
                    .col(ColumnDef::new(ResetTokens::Used).boolean().not_null().default(false))
                    .col(ColumnDef::new(ResetTokens::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reset_tokens_identity_id")
                            .from(ResetTokens::Table, ResetTokens::IdentityId)
                            .to(Identities::Table, Identities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reset_tokens_identity_id")
                    .table(ResetTokens::Table)
                    .col(ResetTokens::IdentityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reset_tokens_expires_at")
                    .table(ResetTokens::Table)
                    .col(ResetTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResetTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Identities::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Identities {
    Table,
    Id,
    Username,
    Email,
    FullName,
    PasswordHash,
    Role,
    Enabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ResetTokens {
    Table,
    Id,
    Token,
    IdentityId,
    ExpiresAt,
    Used,
    CreatedAt,
}
