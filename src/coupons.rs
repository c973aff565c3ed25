//! Coupons
//!
//! A redeemable favor issued by one relationship member to another

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of a coupon
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "coupon_status_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponStatus {
    /// Can be redeemed
    Active,
    /// Redeemed by the recipient
    Redeemed,
    /// Passed its expiration date before being redeemed
    Expired,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub issuer_user_id: Uuid,
    pub recipient_user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template_id: String,
    pub status: CouponStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Has the expiration date passed at `now`?
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// The coupon as observed at `now`, see [`Coupon::status_at`]
    pub fn observed_at(self, now: DateTime<Utc>) -> Self {
        Self {
            status: self.status_at(now),
            ..self
        }
    }

    /// The status as observed at `now`
    ///
    /// An active coupon past its expiration date is expired, even when storage has not caught
    /// up yet
    pub fn status_at(&self, now: DateTime<Utc>) -> CouponStatus {
        match self.status {
            CouponStatus::Active if self.is_past_expiry(now) => CouponStatus::Expired,
            status => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(status: CouponStatus, expires_at: Option<DateTime<Utc>>) -> Coupon {
        let now = Utc::now();

        Coupon {
            id: Uuid::new_v4(),
            relationship_id: Uuid::new_v4(),
            issuer_user_id: Uuid::new_v4(),
            recipient_user_id: Uuid::new_v4(),
            title: "Breakfast in bed".to_string(),
            description: None,
            template_id: "breakfast".to_string(),
            status,
            expires_at,
            redeemed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_at() {
        let now = Utc::now();

        let never_expires = coupon(CouponStatus::Active, None);
        assert_eq!(CouponStatus::Active, never_expires.status_at(now));

        let not_yet = coupon(CouponStatus::Active, Some(now + Duration::days(1)));
        assert_eq!(CouponStatus::Active, not_yet.status_at(now));

        let overdue = coupon(CouponStatus::Active, Some(now - Duration::seconds(1)));
        assert_eq!(CouponStatus::Expired, overdue.status_at(now));

        let redeemed = coupon(CouponStatus::Redeemed, Some(now - Duration::days(1)));
        assert_eq!(CouponStatus::Redeemed, redeemed.status_at(now));
    }
}
