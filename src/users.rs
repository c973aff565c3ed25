//! Users

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

/// A registered user
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    /// User ID
    pub id: Uuid,

    /// Session ID, rotated to invalidate issued tokens
    pub session_id: Uuid,

    /// Login email, always lowercased
    pub email: String,

    /// Name shown to the other members of a relationship
    pub display_name: String,

    /// Argon2 hash of the password
    pub hashed_password: String,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

/// Normalize an email address for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alex@Example.COM "), "alex@example.com");
        assert_eq!(normalize_email("sam@example.com"), "sam@example.com");
    }
}
