// User directory module
// Roster search, lookup, partial update with image replacement, and removal

pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::{delete_user_handler, get_user_handler, list_users_handler, update_user_handler};
pub use memory::InMemoryUserRepository;
pub use models::{User, UserResponse};
pub use repository::{PgUserRepository, UserRepository};
pub use service::UserService;
