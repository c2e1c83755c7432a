//! User entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric user identifier.
pub type UserId = u64;

/// A user in the system.
///
/// Timestamps are `DateTime<Utc>` so a value cached on one host decodes to
/// the identical instant on another, independent of local timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Primary email address.
    pub email: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user created at the given instant.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_user_carries_creation_instant() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let user = User::new(42, "Alice", "alice@example.com", created);
        assert_eq!(user.id, 42);
        assert_eq!(user.created_at, created);
    }
}
