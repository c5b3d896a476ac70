//! Live view-count pipeline.

mod view_count_service;

pub use view_count_service::ViewCountService;
