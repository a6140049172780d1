use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::oidc_authorization_code::Entity")]
    OidcAuthorizationCodes,
    #[sea_orm(has_many = "super::oidc_refresh_token::Entity")]
    OidcRefreshTokens,
    #[sea_orm(has_many = "super::user_authorized_oidc_client::Entity")]
    AuthorizedClients,
}

impl Related<super::oidc_authorization_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OidcAuthorizationCodes.def()
    }
}

impl Related<super::oidc_refresh_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OidcRefreshTokens.def()
    }
}

impl Related<super::user_authorized_oidc_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthorizedClients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
