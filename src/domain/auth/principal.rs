//! The authenticated marketplace user.
//!
//! A `Principal` is either loaded by the login collaborator after an OAuth2
//! exchange or rebuilt from verified claims. It is immutable for the lifetime
//! of a request and is inserted into request extensions by the auth middleware.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{UserId, ValidationError};

/// Marketplace account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_SOCIAL")]
    Social,
    #[serde(rename = "ROLE_RETAILER")]
    Retailer,
    #[serde(rename = "ROLE_WHOLESALER")]
    Wholesaler,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Social => "ROLE_SOCIAL",
            Role::Retailer => "ROLE_RETAILER",
            Role::Wholesaler => "ROLE_WHOLESALER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_SOCIAL" => Ok(Role::Social),
            "ROLE_RETAILER" => Ok(Role::Retailer),
            "ROLE_WHOLESALER" => Ok(Role::Wholesaler),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Authenticated user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl Principal {
    pub fn new(id: UserId, role: Role, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            role,
            name: name.into(),
            email: email.into(),
        }
    }
}
