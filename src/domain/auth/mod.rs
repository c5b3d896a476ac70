//! Credential lifecycle domain.
//!
//! Pure types shared by the token codec, the credential service and the
//! authentication gate. Nothing here touches I/O.

mod claims;
mod gate;
mod principal;
mod session;
mod token_error;

pub use claims::{Claims, TokenKind};
pub use gate::{GateOutcome, GateState, LogoutOutcome};
pub use principal::{Principal, Role};
pub use session::SessionRecord;
pub use token_error::TokenError;
