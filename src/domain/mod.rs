//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, response codes)
//! - `auth` - Principals, claims and the authentication gate states
//! - `catalog` - Channels, product tree snapshots and view-count events

pub mod auth;
pub mod catalog;
pub mod foundation;
