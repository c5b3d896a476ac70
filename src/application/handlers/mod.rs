//! Application handlers organized by concern.

pub mod auth;
pub mod live;

pub use auth::{
    AuthGate, CredentialError, CredentialPair, CredentialService, CredentialSettings,
    FilterResult,
};
pub use live::ViewCountService;
