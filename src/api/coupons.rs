//! Coupon API management

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::coupons::Coupon;
use crate::coupons::CouponStatus;
use crate::storage::Activity;
use crate::storage::CreateCouponValues;
use crate::storage::Storage;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::utils::fetch_active_member;
use super::utils::fetch_coupon;
use super::utils::fetch_relationship;
use super::utils::parse_optional_text;
use super::utils::parse_short_text;
use super::utils::parse_title;
use super::utils::resolve_relationship;

/// Issue coupon form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponForm {
    /// The relationship to issue the coupon in
    relationship_id: Uuid,
    /// Who can redeem the coupon
    recipient_user_id: Uuid,
    title: String,
    description: Option<String>,
    /// Design of the coupon in the app
    template_id: String,
    /// Optional expiration date, must be in the future
    expires_at: Option<DateTime<Utc>>,
}

/// Issue a coupon to another member of the relationship
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "relationshipId": "<uuid>", "recipientUserId": "<uuid>", "title": "Breakfast in bed", "templateId": "breakfast" }' \
///     http://localhost:6000/api/coupons
/// ```
///
/// Response
/// ```json
/// { "ok": true, "coupon": { "id": "<uuid>", "status": "ACTIVE", "description": null, ... } }
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateCouponForm>,
) -> Result<Success<Coupon>, Error> {
    let now = Utc::now();

    let relationship = fetch_relationship(&storage, &form.relationship_id, &current_user).await?;

    let title = parse_title(&form.title)?;

    let template_id = parse_short_text(&form.template_id, "Template")?;

    if form.recipient_user_id == current_user.id {
        return Err(Error::bad_request(
            "Recipient must be another member of the relationship",
        ));
    }

    let recipient = storage
        .find_single_member(&relationship.id, &form.recipient_user_id)
        .await
        .map_err(Error::internal_server_error)?;

    if !recipient.is_some_and(|recipient| recipient.is_active()) {
        return Err(Error::bad_request(
            "Recipient must be another member of the relationship",
        ));
    }

    if form.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(Error::bad_request("Expiration date must be in the future"));
    }

    let description = parse_optional_text(form.description);

    let values = CreateCouponValues {
        relationship: &relationship,
        issuer: &current_user,
        recipient_user_id: &form.recipient_user_id,
        title: &title,
        description: description.as_deref(),
        template_id,
        expires_at: form.expires_at,
    };

    let coupon = storage
        .create_coupon(&values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log.register(Activity::CreateCoupon(&coupon)).await;

    Ok(Success::created("coupon", coupon))
}

/// Filters for listing coupons
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCouponsQuery {
    /// Defaults to the active relationship of the current user
    relationship_id: Option<Uuid>,
    /// Only coupons with this status, as observed now
    status: Option<CouponStatus>,
}

/// List the coupons of a relationship, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/coupons?status=ACTIVE'
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<ListCouponsQuery>,
) -> Result<Success<Vec<Coupon>>, Error> {
    let now = Utc::now();

    let relationship =
        resolve_relationship(&storage, query.relationship_id.as_ref(), &current_user).await?;

    let coupons = storage
        .find_all_coupons_by_relationship(&relationship)
        .await
        .map_err(Error::internal_server_error)?
        .into_iter()
        .map(|coupon| coupon.observed_at(now))
        .filter(|coupon| query.status.is_none_or(|status| coupon.status == status))
        .collect();

    Ok(Success::ok("coupons", coupons))
}

/// Get a single coupon
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(coupon_id): PathParameters<Uuid>,
) -> Result<Success<Coupon>, Error> {
    let coupon = fetch_coupon(&storage, &coupon_id, &current_user).await?;

    Ok(Success::ok("coupon", coupon.observed_at(Utc::now())))
}

/// Redeem a coupon
///
/// Only the recipient can redeem, and only while the coupon is active
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/coupons/<uuid>/redeem
/// ```
pub async fn redeem<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(coupon_id): PathParameters<Uuid>,
) -> Result<Success<Coupon>, Error> {
    let now = Utc::now();

    let coupon = fetch_coupon(&storage, &coupon_id, &current_user).await?;

    if coupon.recipient_user_id != current_user.id {
        return Err(Error::forbidden("Only the recipient can redeem a coupon"));
    }

    ensure_redeemable(&coupon, now)?;

    let Some(coupon) = storage
        .redeem_coupon(&coupon, now)
        .await
        .map_err(Error::internal_server_error)?
    else {
        // redeemed, expired or deleted since it was fetched
        let coupon = fetch_coupon(&storage, &coupon_id, &current_user).await?;
        ensure_redeemable(&coupon, now)?;

        return Err(Error::bad_request("Coupon is already redeemed"));
    };

    activity_log.register(Activity::RedeemCoupon(&coupon)).await;

    Ok(Success::ok("coupon", coupon))
}

/// Only active coupons can be redeemed
fn ensure_redeemable(coupon: &Coupon, now: DateTime<Utc>) -> Result<(), Error> {
    match coupon.status_at(now) {
        CouponStatus::Active => Ok(()),
        CouponStatus::Redeemed => Err(Error::bad_request("Coupon is already redeemed")),
        CouponStatus::Expired => Err(Error::bad_request("Coupon is expired")),
    }
}

/// Delete a coupon, only the issuer can
///
/// Request:
/// ```sh
/// curl -v -XDELETE -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/coupons/<uuid>
/// ```
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(coupon_id): PathParameters<Uuid>,
) -> Result<Success<()>, Error> {
    let coupon = fetch_coupon(&storage, &coupon_id, &current_user).await?;

    if coupon.issuer_user_id != current_user.id {
        return Err(Error::forbidden("Only the issuer can delete a coupon"));
    }

    // the issuer may have left the relationship since
    fetch_active_member(&storage, &coupon.relationship_id, &current_user).await?;

    storage
        .delete_coupon(&coupon)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log.register(Activity::DeleteCoupon(&coupon)).await;

    Ok(Success::done())
}
