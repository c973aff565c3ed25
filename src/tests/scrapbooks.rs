use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_scrapbooks() {
    let mut app = helper::setup_test_app();

    let (relationship, (_, alex_token), (_, sam_token)) = helper::setup_couple(&mut app).await;

    // create scrapbook
    let payload = json!({
        "relationshipId": relationship.id,
        "title": "  Summer in Lisbon ",
        "cover": {
            "blobKey": "covers/lisbon.jpg",
            "url": "https://cdn.example.com/covers/lisbon.jpg",
            "width": 1200,
            "height": 800,
        },
        "details": {
            "date": "2026-07-14",
            "place": "Lisbon",
            "moodTags": ["sunny", "  ", " cozy "],
        },
    });
    let (status_code, scrapbook, _) =
        helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let scrapbook = scrapbook.unwrap();
    assert_eq!("Summer in Lisbon".to_string(), scrapbook.title);
    assert_eq!(
        Some("https://cdn.example.com/covers/lisbon.jpg".to_string()),
        scrapbook.cover_url
    );
    assert_eq!(Some("2026-07-14".to_string()), scrapbook.details.date);
    assert_eq!(Some("Lisbon".to_string()), scrapbook.details.place);
    assert_eq!(
        vec!["sunny".to_string(), "cozy".to_string()],
        scrapbook.details.mood_tags
    );

    // a second one, listed first
    let other = helper::create_scrapbook(&mut app, &sam_token, &relationship.id, "Winter").await;

    let (status_code, scrapbooks, _) = helper::list_scrapbooks(&mut app, &alex_token, "").await;
    assert_eq!(StatusCode::OK, status_code);
    let scrapbooks = scrapbooks.unwrap();
    assert_eq!(2, scrapbooks.len());
    assert_eq!(other.id, scrapbooks[0].id);
    assert_eq!(scrapbook.id, scrapbooks[1].id);

    // single
    let (status_code, single, _) = helper::single_scrapbook(&mut app, &sam_token, &scrapbook.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("Summer in Lisbon".to_string(), single.unwrap().title);

    // update just the title, the cover stays
    let payload = json!({ "title": "Autumn in Porto" });
    let (status_code, updated, _) =
        helper::maybe_update_scrapbook(&mut app, &sam_token, &scrapbook.id, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let updated = updated.unwrap();
    assert_eq!("Autumn in Porto".to_string(), updated.title);
    assert!(updated.cover_url.is_some());

    // remove the cover
    let payload = json!({ "cover": null });
    let (status_code, updated, _) =
        helper::maybe_update_scrapbook(&mut app, &alex_token, &scrapbook.id, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let updated = updated.unwrap();
    assert_eq!("Autumn in Porto".to_string(), updated.title);
    assert_eq!(None, updated.cover_url);

    // the title can not be cleared
    let payload = json!({ "title": null });
    let (status_code, _, error) =
        helper::maybe_update_scrapbook(&mut app, &alex_token, &scrapbook.id, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some(helper::Error {
            error: "Invalid field".to_string(),
            details: Some("`title` can not be null".to_string()),
        }),
        error
    );

    // delete
    let (status_code, _) = helper::maybe_delete_scrapbook(&mut app, &sam_token, &scrapbook.id).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, _, message) = helper::single_scrapbook(&mut app, &alex_token, &scrapbook.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Scrapbook not found".to_string()), message);

    let (_, scrapbooks, _) = helper::list_scrapbooks(&mut app, &alex_token, "").await;
    assert_eq!(1, scrapbooks.unwrap().len());
}

#[tokio::test]
async fn test_scrapbook_details() {
    let mut app = helper::setup_test_app();

    let (relationship, (_, alex_token), _) = helper::setup_couple(&mut app).await;

    let scrapbook = helper::create_scrapbook(&mut app, &alex_token, &relationship.id, "Road trip").await;

    // empty by default
    let (status_code, details, _) = helper::details(&mut app, &alex_token, &scrapbook.id, None).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(
        helper::Details {
            date: None,
            place: None,
            mood_tags: vec![],
            review: None,
        },
        details.unwrap()
    );

    // set some
    let payload = json!({
        "place": "Route 66",
        "review": "Best trip ever",
        "moodTags": ["adventurous"],
    });
    let (status_code, details, _) =
        helper::maybe_update_details(&mut app, &alex_token, &scrapbook.id, None, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let details = details.unwrap();
    assert_eq!(Some("Route 66".to_string()), details.place);
    assert_eq!(vec!["adventurous".to_string()], details.mood_tags);

    // clear the review, leave the rest
    let payload = json!({ "review": null });
    let (status_code, details, _) =
        helper::maybe_update_details(&mut app, &alex_token, &scrapbook.id, None, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let details = details.unwrap();
    assert_eq!(None, details.review);
    assert_eq!(Some("Route 66".to_string()), details.place);

    // too many mood tags
    let mood_tags = (0..11).map(|index| format!("tag{index}")).collect::<Vec<String>>();
    let payload = json!({ "moodTags": mood_tags });
    let (status_code, _, error) =
        helper::maybe_update_details(&mut app, &alex_token, &scrapbook.id, None, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Too many mood tags".to_string(), error.unwrap().error);
}

#[tokio::test]
async fn test_invalid_scrapbooks() {
    let mut app = helper::setup_test_app();

    let (relationship, (_, alex_token), _) = helper::setup_couple(&mut app).await;

    // without title
    let payload = json!({ "relationshipId": relationship.id, "title": "" });
    let (status_code, _, message) = helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Title is required".to_string()), message);

    // title too long
    let payload = json!({ "relationshipId": relationship.id, "title": "a".repeat(121) });
    let (status_code, _, message) = helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Title is too long".to_string()), message);

    // cover with an invalid URL
    let payload = json!({
        "relationshipId": relationship.id,
        "title": "Summer",
        "cover": { "blobKey": "covers/a.jpg", "url": "not a url", "width": 10, "height": 10 },
    });
    let (status_code, _, message) = helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid URL".to_string()), message);

    // cover without size
    let payload = json!({
        "relationshipId": relationship.id,
        "title": "Summer",
        "cover": { "blobKey": "covers/a.jpg", "url": "https://cdn.example.com/a.jpg", "width": 0, "height": 10 },
    });
    let (status_code, _, message) = helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid cover".to_string()), message);

    // unknown relationship
    let payload = json!({ "relationshipId": Uuid::new_v4(), "title": "Summer" });
    let (status_code, _, message) = helper::maybe_create_scrapbook(&mut app, &alex_token, &payload).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Relationship not found".to_string()), message);

    // unknown scrapbook
    let (status_code, _, message) =
        helper::single_scrapbook(&mut app, &alex_token, &Uuid::new_v4()).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Scrapbook not found".to_string()), message);
}

#[tokio::test]
async fn test_scrapbooks_of_others() {
    let mut app = helper::setup_test_app();

    let (relationship, (_, alex_token), _) = helper::setup_couple(&mut app).await;
    let scrapbook = helper::create_scrapbook(&mut app, &alex_token, &relationship.id, "Ours").await;

    let (_, outsider_token) = helper::register_and_login(&mut app, "kim@example.com", "Kim").await;

    let (status_code, _, message) =
        helper::single_scrapbook(&mut app, &outsider_token, &scrapbook.id).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(
        Some("Not a member of this relationship".to_string()),
        message
    );

    let (status_code, _) = helper::maybe_delete_scrapbook(&mut app, &outsider_token, &scrapbook.id).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);

    let (status_code, _, message) = helper::list_scrapbooks(
        &mut app,
        &outsider_token,
        &format!("?relationshipId={}", relationship.id),
    )
    .await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(
        Some("Not a member of this relationship".to_string()),
        message
    );

    // without a relationship of its own
    let (status_code, _, message) = helper::list_scrapbooks(&mut app, &outsider_token, "").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Relationship not found".to_string()), message);
}
