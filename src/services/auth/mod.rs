pub mod access_jwt;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod jwks;

pub use access_jwt::AuthService;
pub use bearer::bearer_token;
pub use claims::Claims;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use jwks::{JwksKeyStore, KeySource, StaticKeySet};
