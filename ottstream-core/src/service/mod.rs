pub mod auth;
pub mod catalog;
pub mod history;
pub mod thumbnail;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use history::HistoryService;
pub use thumbnail::ThumbnailService;
