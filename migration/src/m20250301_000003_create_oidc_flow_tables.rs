use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_users_and_groups::Users;
use crate::m20250301_000002_create_oidc_clients::OidcClients;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OidcAuthorizationCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OidcAuthorizationCodes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OidcAuthorizationCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(OidcAuthorizationCodes::Scope))
                    .col(string(OidcAuthorizationCodes::Nonce))
                    .col(string_null(OidcAuthorizationCodes::CodeChallenge))
                    .col(boolean_null(OidcAuthorizationCodes::CodeChallengeMethodSha256))
                    .col(big_integer(OidcAuthorizationCodes::ExpiresAt))
                    .col(string(OidcAuthorizationCodes::UserId))
                    .col(string(OidcAuthorizationCodes::ClientId))
                    .col(big_integer(OidcAuthorizationCodes::CreatedAt))
                    .col(big_integer(OidcAuthorizationCodes::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_authorization_codes_user")
                            .from(OidcAuthorizationCodes::Table, OidcAuthorizationCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_authorization_codes_client")
                            .from(OidcAuthorizationCodes::Table, OidcAuthorizationCodes::ClientId)
                            .to(OidcClients::Table, OidcClients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_oidc_authorization_codes_expires_at")
                    .table(OidcAuthorizationCodes::Table)
                    .col(OidcAuthorizationCodes::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OidcRefreshTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OidcRefreshTokens::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OidcRefreshTokens::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(big_integer(OidcRefreshTokens::ExpiresAt))
                    .col(string(OidcRefreshTokens::Scope))
                    .col(string(OidcRefreshTokens::UserId))
                    .col(string(OidcRefreshTokens::ClientId))
                    .col(big_integer(OidcRefreshTokens::CreatedAt))
                    .col(big_integer(OidcRefreshTokens::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_refresh_tokens_user")
                            .from(OidcRefreshTokens::Table, OidcRefreshTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_refresh_tokens_client")
                            .from(OidcRefreshTokens::Table, OidcRefreshTokens::ClientId)
                            .to(OidcClients::Table, OidcClients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_oidc_refresh_tokens_expires_at")
                    .table(OidcRefreshTokens::Table)
                    .col(OidcRefreshTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // Device Authorization Grant (RFC 8628); user_id stays NULL until approval
        manager
            .create_table(
                Table::create()
                    .table(OidcDeviceCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OidcDeviceCodes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OidcDeviceCodes::DeviceCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OidcDeviceCodes::UserCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(OidcDeviceCodes::Scope))
                    .col(string(OidcDeviceCodes::Nonce))
                    .col(big_integer(OidcDeviceCodes::ExpiresAt))
                    .col(
                        ColumnDef::new(OidcDeviceCodes::IsAuthorized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(string_null(OidcDeviceCodes::UserId))
                    .col(string(OidcDeviceCodes::ClientId))
                    .col(big_integer(OidcDeviceCodes::CreatedAt))
                    .col(big_integer(OidcDeviceCodes::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_device_codes_user")
                            .from(OidcDeviceCodes::Table, OidcDeviceCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_device_codes_client")
                            .from(OidcDeviceCodes::Table, OidcDeviceCodes::ClientId)
                            .to(OidcClients::Table, OidcClients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_oidc_device_codes_expires_at")
                    .table(OidcDeviceCodes::Table)
                    .col(OidcDeviceCodes::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // One grant per (user, client); repeated consent updates the row
        manager
            .create_table(
                Table::create()
                    .table(UserAuthorizedOidcClients::Table)
                    .if_not_exists()
                    .col(string(UserAuthorizedOidcClients::UserId))
                    .col(string(UserAuthorizedOidcClients::ClientId))
                    .col(string(UserAuthorizedOidcClients::Scope))
                    .col(big_integer(UserAuthorizedOidcClients::LastUsedAt))
                    .primary_key(
                        Index::create()
                            .col(UserAuthorizedOidcClients::UserId)
                            .col(UserAuthorizedOidcClients::ClientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_authorized_oidc_clients_user")
                            .from(UserAuthorizedOidcClients::Table, UserAuthorizedOidcClients::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_authorized_oidc_clients_client")
                            .from(UserAuthorizedOidcClients::Table, UserAuthorizedOidcClients::ClientId)
                            .to(OidcClients::Table, OidcClients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(UserAuthorizedOidcClients::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(OidcDeviceCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OidcRefreshTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(OidcAuthorizationCodes::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum OidcAuthorizationCodes {
    Table,
    Id,
    Code,
    Scope,
    Nonce,
    CodeChallenge,
    CodeChallengeMethodSha256,
    ExpiresAt,
    UserId,
    ClientId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OidcRefreshTokens {
    Table,
    Id,
    Token,
    ExpiresAt,
    Scope,
    UserId,
    ClientId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OidcDeviceCodes {
    Table,
    Id,
    DeviceCode,
    UserCode,
    Scope,
    Nonce,
    ExpiresAt,
    IsAuthorized,
    UserId,
    ClientId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserAuthorizedOidcClients {
    Table,
    UserId,
    ClientId,
    Scope,
    LastUsedAt,
}
