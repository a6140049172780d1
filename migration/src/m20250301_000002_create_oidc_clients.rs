use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_users_and_groups::{UserGroups, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OidcClients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OidcClients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(OidcClients::Name))
                    .col(string_null(OidcClients::Secret))
                    .col(text(OidcClients::CallbackUrls))
                    .col(text(OidcClients::LogoutCallbackUrls))
                    .col(string_null(OidcClients::ImageType))
                    .col(string_null(OidcClients::DarkImageType))
                    .col(
                        ColumnDef::new(OidcClients::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OidcClients::PkceEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OidcClients::RequiresReauthentication)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(text_null(OidcClients::Credentials))
                    .col(string_null(OidcClients::LaunchUrl))
                    .col(
                        ColumnDef::new(OidcClients::IsGroupRestricted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OidcClients::Visibility)
                            .string()
                            .not_null()
                            .default("permission"),
                    )
                    .col(string_null(OidcClients::CreatedById))
                    .col(big_integer(OidcClients::CreatedAt))
                    .col(big_integer(OidcClients::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oidc_clients_created_by")
                            .from(OidcClients::Table, OidcClients::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Many-to-many: clients restricted to user groups
        manager
            .create_table(
                Table::create()
                    .table(OidcClientsAllowedUserGroups::Table)
                    .if_not_exists()
                    .col(string(OidcClientsAllowedUserGroups::OidcClientId))
                    .col(string(OidcClientsAllowedUserGroups::UserGroupId))
                    .primary_key(
                        Index::create()
                            .col(OidcClientsAllowedUserGroups::OidcClientId)
                            .col(OidcClientsAllowedUserGroups::UserGroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allowed_groups_client")
                            .from(
                                OidcClientsAllowedUserGroups::Table,
                                OidcClientsAllowedUserGroups::OidcClientId,
                            )
                            .to(OidcClients::Table, OidcClients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allowed_groups_group")
                            .from(
                                OidcClientsAllowedUserGroups::Table,
                                OidcClientsAllowedUserGroups::UserGroupId,
                            )
                            .to(UserGroups::Table, UserGroups::Id)
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
                    .table(OidcClientsAllowedUserGroups::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(OidcClients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OidcClients {
    Table,
    Id,
    Name,
    Secret,
    CallbackUrls,
    LogoutCallbackUrls,
    ImageType,
    DarkImageType,
    IsPublic,
    PkceEnabled,
    RequiresReauthentication,
    Credentials,
    LaunchUrl,
    IsGroupRestricted,
    Visibility,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OidcClientsAllowedUserGroups {
    Table,
    OidcClientId,
    UserGroupId,
}
