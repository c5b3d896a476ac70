//! Main-page snapshot endpoints under `/api/main`.

mod dto;
mod handlers;
mod routes;

pub use dto::{RemainingTimeResponse, SnapshotStoredResponse, ViewCountResponse};
pub use routes::main_page_routes;
