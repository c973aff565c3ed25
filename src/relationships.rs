//! Relationships and their members

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Role of a member within a relationship
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "member_role_type", rename_all = "lowercase")]
pub enum MemberRole {
    /// Created the relationship, can invite others
    Owner,
    /// Joined the relationship
    Member,
}

/// Membership status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "member_status_type", rename_all = "lowercase")]
pub enum MemberStatus {
    /// Full member
    Active,
    /// Invited, has not joined yet
    Pending,
}

/// A relationship, the pairing of users that owns scrapbooks and coupons
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Relationship ID
    pub id: Uuid,

    /// Code to share with a partner to join
    pub invite_code: String,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

/// A user within a relationship
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// The relationship
    pub relationship_id: Uuid,

    /// The user
    pub user_id: Uuid,

    /// Email of the user
    pub email: String,

    /// Display name of the user
    pub display_name: String,

    /// Role within the relationship
    pub role: MemberRole,

    /// Membership status
    pub status: MemberStatus,

    /// Invited or joined at
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Is the member a full member?
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Normalize a user provided invite code
pub fn normalize_invite_code(invite_code: &str) -> String {
    invite_code.trim().to_uppercase()
}
