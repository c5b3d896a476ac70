//! HTTP middleware.

pub mod auth;
pub mod logout;

pub use auth::{auth_filter, require_auth, AccessTokenBody, AuthFailure, RequireAuth, SOCKET_PATH_PREFIX};
pub use logout::{logout_filter, LOGOUT_PATH};
