pub mod database;
pub mod user;

pub use database::init_database;
pub use user::seed_default_users;
