use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub friendly_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::oidc_client::Entity> for Entity {
    fn to() -> RelationDef {
        super::oidc_client_allowed_user_group::Relation::OidcClient.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::oidc_client_allowed_user_group::Relation::UserGroup.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
