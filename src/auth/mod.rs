// Authentication module
// Registration, login, JWT issuance and the bearer-token access-control layers

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, register_handler};
pub use middleware::{admin_only, protect, AuthenticatedUser};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, Role};
pub use password::PasswordService;
pub use service::AuthService;
pub use token::{Claims, TokenKind, TokenService};
