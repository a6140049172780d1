use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oidc_clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub secret: Option<String>,
    pub callback_urls: String,        // JSON-encoded UrlList
    pub logout_callback_urls: String, // JSON-encoded UrlList
    pub image_type: Option<String>,
    pub dark_image_type: Option<String>,
    pub is_public: bool,
    pub pkce_enabled: bool,
    pub requires_reauthentication: bool,
    pub credentials: Option<String>, // JSON-encoded OidcClientCredentials
    pub launch_url: Option<String>,
    pub is_group_restricted: bool,
    pub visibility: String, // "shown" | "hidden" | "permission"
    pub created_by_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    CreatedBy,
    #[sea_orm(has_many = "super::oidc_authorization_code::Entity")]
    OidcAuthorizationCodes,
    #[sea_orm(has_many = "super::oidc_refresh_token::Entity")]
    OidcRefreshTokens,
    #[sea_orm(has_many = "super::oidc_device_code::Entity")]
    OidcDeviceCodes,
    #[sea_orm(has_many = "super::user_authorized_oidc_client::Entity")]
    AuthorizedUsers,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl Related<super::oidc_refresh_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OidcRefreshTokens.def()
    }
}

impl Related<super::user_authorized_oidc_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthorizedUsers.def()
    }
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        super::oidc_client_allowed_user_group::Relation::UserGroup.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::oidc_client_allowed_user_group::Relation::OidcClient.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
