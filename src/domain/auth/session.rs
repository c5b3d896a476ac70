use crate::domain::foundation::{Timestamp, UserId};

/// The one stored refresh credential for a user.
///
/// The stored value is always the last issued refresh credential; any other
/// presented value for the same user is a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub refresh_token: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionRecord {
    pub fn new(user_id: UserId, refresh_token: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            refresh_token: refresh_token.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Byte-for-byte comparison in constant time.
    pub fn matches(&self, presented: &str) -> bool {
        use subtle::ConstantTimeEq;
        self.refresh_token.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}
