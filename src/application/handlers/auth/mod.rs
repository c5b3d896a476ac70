//! Credential issuance, rotation and the authentication gate.

mod auth_gate;
mod credential_service;

pub use auth_gate::{AuthGate, FilterResult};
pub use credential_service::{
    CredentialError, CredentialPair, CredentialService, CredentialSettings,
};
