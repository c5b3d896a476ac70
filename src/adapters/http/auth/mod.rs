//! Login success path.

mod login;

pub use login::login_success;
