pub mod builders;
pub mod db;

pub use builders::{ClientBuilder, UserBuilder};
pub use db::TestDb;
