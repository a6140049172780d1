use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "oidc_clients_allowed_user_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub oidc_client_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oidc_client::Entity",
        from = "Column::OidcClientId",
        to = "super::oidc_client::Column::Id",
        on_delete = "Cascade"
    )]
    OidcClient,
    #[sea_orm(
        belongs_to = "super::user_group::Entity",
        from = "Column::UserGroupId",
        to = "super::user_group::Column::Id",
        on_delete = "Cascade"
    )]
    UserGroup,
}

impl ActiveModelBehavior for ActiveModel {}
