pub mod auth_ctx;
pub mod json;
pub mod path_id;

pub use auth_ctx::*;
pub use json::ApiJson;
pub use path_id::*;
