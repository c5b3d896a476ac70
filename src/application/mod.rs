//! Application layer - orchestrates domain operations across ports.

pub mod handlers;

pub use handlers::{
    AuthGate, CredentialError, CredentialPair, CredentialService, CredentialSettings,
    FilterResult, ViewCountService,
};
