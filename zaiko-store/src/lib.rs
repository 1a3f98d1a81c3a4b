pub mod app_config;
pub mod database;
pub mod product_repo;
pub mod user_repo;

pub use database::DbClient;
pub use product_repo::PgProductStore;
pub use user_repo::PgUserStore;
