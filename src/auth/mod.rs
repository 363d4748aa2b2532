// Authentication module
// JWT bearer tokens, argon2 password verification and principal extraction

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler};
pub use middleware::MaybePrincipal;
pub use models::{LoginRequest, Principal, Role, TokenResponse, User, UserResponse};
pub use repository::{PgUserRepository, UserRepository};
pub use service::AuthService;
pub use token::TokenService;
