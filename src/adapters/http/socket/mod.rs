//! Membership maintenance over plain HTTP.

mod handlers;

pub use handlers::{leave_channel, socket_routes, LeaveRequest, LeaveResponse};
