//! Market Live - credential lifecycle and live view counts for the
//! wholesale marketplace.
//!
//! Issues and rotates signed access/refresh credentials, gates HTTP requests
//! on them, and fans product view-count increments out to socket clients
//! through a shared cache and pub/sub broker.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
