pub mod history;
pub mod session;
pub mod user;
pub mod video;

pub use history::HistoryRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
