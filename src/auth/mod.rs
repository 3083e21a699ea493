//! Bearer token authentication and the account endpoints.

mod form;
mod log_in;
mod middleware;
mod password;
mod profile;
mod register;
mod token;

pub use log_in::log_in_endpoint;
pub use middleware::auth_guard;
pub use password::{PasswordHash, PasswordPolicyError, ValidatedPassword};
pub use profile::{change_password_endpoint, get_me_endpoint, update_profile_endpoint};
pub use register::register_endpoint;
pub use token::TokenManager;
