pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_and_groups;
mod m20250301_000002_create_oidc_clients;
mod m20250301_000003_create_oidc_flow_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_and_groups::Migration),
            Box::new(m20250301_000002_create_oidc_clients::Migration),
            Box::new(m20250301_000003_create_oidc_flow_tables::Migration),
        ]
    }
}
