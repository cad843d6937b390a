pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod routes;
pub mod types;

pub use auth::{AuthBackend, AuthError, AuthSession, Credentials, MockAuthBackend, SessionEvent};
pub use catalog::Catalog;
pub use config::TravelCareConfig;
pub use error::{Result, TravelCareError};
pub use routes::Route;
pub use types::*;
