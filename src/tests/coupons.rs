use std::time::Duration;

use axum::http::StatusCode;
use chrono::TimeDelta;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_coupons() {
    let mut app = helper::setup_test_app();

    let (relationship, (alex, alex_token), (sam, sam_token)) = helper::setup_couple(&mut app).await;

    // create coupon for sam
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Breakfast in bed",
        "description": "  Pancakes included  ",
        "templateId": "breakfast",
    });
    let (status_code, coupon, _) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let coupon = coupon.unwrap();
    assert_eq!("ACTIVE".to_string(), coupon.status);
    assert_eq!(Some("Pancakes included".to_string()), coupon.description);

    // both members see it
    let (status_code, coupons, _) = helper::list_coupons(&mut app, &sam_token, "").await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(1, coupons.unwrap().len());

    let (status_code, coupons, _) = helper::list_coupons(
        &mut app,
        &alex_token,
        &format!("?relationshipId={}", relationship.id),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(1, coupons.unwrap().len());

    // the issuer can not redeem
    let (status_code, _, message) = helper::maybe_redeem_coupon(&mut app, &alex_token, &coupon.id).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(
        Some("Only the recipient can redeem a coupon".to_string()),
        message
    );

    // the recipient can
    let (status_code, redeemed, _) = helper::maybe_redeem_coupon(&mut app, &sam_token, &coupon.id).await;
    assert_eq!(StatusCode::OK, status_code);
    let redeemed = redeemed.unwrap();
    assert_eq!("REDEEMED".to_string(), redeemed.status);
    assert!(redeemed.redeemed_at.is_some());

    // only once
    let (status_code, _, message) = helper::maybe_redeem_coupon(&mut app, &sam_token, &coupon.id).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Coupon is already redeemed".to_string()), message);

    // filter by status
    let (_, coupons, _) = helper::list_coupons(&mut app, &sam_token, "?status=ACTIVE").await;
    assert!(coupons.unwrap().is_empty());

    let (_, coupons, _) = helper::list_coupons(&mut app, &sam_token, "?status=REDEEMED").await;
    assert_eq!(1, coupons.unwrap().len());

    let (status_code, _, message) =
        helper::list_coupons(&mut app, &sam_token, "?status=LOST").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid query parameter".to_string()), message);

    // only the issuer can delete
    let (status_code, message) = helper::maybe_delete_coupon(&mut app, &sam_token, &coupon.id).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Only the issuer can delete a coupon".to_string()), message);

    let (status_code, _) = helper::maybe_delete_coupon(&mut app, &alex_token, &coupon.id).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, _, message) = helper::single_coupon(&mut app, &alex_token, &coupon.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Coupon not found".to_string()), message);

    // sam can issue coupons too
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": alex.id,
        "title": "Movie night",
        "templateId": "movie",
    });
    let (status_code, coupon, _) = helper::maybe_create_coupon(&mut app, &sam_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let coupon = coupon.unwrap();
    assert_eq!(None, coupon.description);
    assert_eq!("ACTIVE".to_string(), coupon.status);
    assert_eq!(None, coupon.redeemed_at);
}

#[tokio::test]
async fn test_invalid_coupons() {
    let mut app = helper::setup_test_app();

    let (relationship, (alex, alex_token), (sam, _)) = helper::setup_couple(&mut app).await;

    // to self
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": alex.id,
        "title": "Breakfast in bed",
        "templateId": "breakfast",
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Recipient must be another member of the relationship".to_string()),
        message
    );

    // to a stranger
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": Uuid::new_v4(),
        "title": "Breakfast in bed",
        "templateId": "breakfast",
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Recipient must be another member of the relationship".to_string()),
        message
    );

    // expiring in the past
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Breakfast in bed",
        "templateId": "breakfast",
        "expiresAt": Utc::now() - TimeDelta::hours(1),
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Expiration date must be in the future".to_string()),
        message
    );

    // without title
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "  ",
        "templateId": "breakfast",
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Title is required".to_string()), message);

    // without template
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Breakfast in bed",
        "templateId": "",
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Template is required".to_string()), message);

    // template too long
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Breakfast in bed",
        "templateId": "b".repeat(256),
    });
    let (status_code, _, message) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Template is too long".to_string()), message);

    // in a relationship that is not yours
    let (_, outsider_token) =
        helper::register_and_login(&mut app, "kim@example.com", "Kim").await;
    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Breakfast in bed",
        "templateId": "breakfast",
    });
    let (status_code, _, message) =
        helper::maybe_create_coupon(&mut app, &outsider_token, &payload).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(
        Some("Not a member of this relationship".to_string()),
        message
    );
}

#[tokio::test]
async fn test_expired_coupon() {
    let mut app = helper::setup_test_app();

    let (relationship, (_, alex_token), (sam, sam_token)) = helper::setup_couple(&mut app).await;

    let payload = json!({
        "relationshipId": relationship.id,
        "recipientUserId": sam.id,
        "title": "Dance lesson",
        "templateId": "dance",
        "expiresAt": Utc::now() + TimeDelta::seconds(1),
    });
    let (status_code, coupon, _) = helper::maybe_create_coupon(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let coupon = coupon.unwrap();
    assert_eq!("ACTIVE".to_string(), coupon.status);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    // expired without any sweep
    let (status_code, single, _) = helper::single_coupon(&mut app, &sam_token, &coupon.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("EXPIRED".to_string(), single.unwrap().status);

    let (_, coupons, _) = helper::list_coupons(&mut app, &sam_token, "?status=EXPIRED").await;
    assert_eq!(1, coupons.unwrap().len());

    let (status_code, _, message) = helper::maybe_redeem_coupon(&mut app, &sam_token, &coupon.id).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Coupon is expired".to_string()), message);
}
