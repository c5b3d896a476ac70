//! PostgreSQL adapters.
//!
//! - `PostgresSessionStore` - the `refresh_token` table

mod session_store;

pub use session_store::PostgresSessionStore;
