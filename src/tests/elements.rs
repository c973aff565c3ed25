use axum::Router;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::tests::helper;

/// A couple with a scrapbook of a single page
async fn setup_page(app: &mut Router) -> (String, Uuid, Uuid) {
    let (relationship, (_, access_token), _) = helper::setup_couple(app).await;

    let scrapbook = helper::create_scrapbook(app, &access_token, &relationship.id, "Summer").await;
    let page = helper::create_page(app, &access_token, &scrapbook.id).await;

    (access_token, scrapbook.id, page.id)
}

fn element_id(element: &serde_json::Map<String, serde_json::Value>) -> Uuid {
    element["id"].as_str().map(Uuid::parse_str).unwrap().unwrap()
}

#[tokio::test]
async fn test_media() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;

    // place a photo with the default transform
    let payload = json!({
        "blobKey": "photos/beach.jpg",
        "url": "https://cdn.example.com/photos/beach.jpg",
        "width": 4032,
        "height": 3024,
    });
    let (status_code, media, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let media = media.unwrap();
    assert_eq!(Some("photo"), media["kind"].as_str());
    assert_eq!(Some(0.0), media["x"].as_f64());
    assert_eq!(Some(0.0), media["y"].as_f64());
    assert_eq!(Some(1.0), media["scale"].as_f64());
    assert_eq!(Some(0.0), media["rotation"].as_f64());
    let media_id = element_id(&media);

    // move it
    let payload = json!({ "x": 12.5, "y": -4, "rotation": 90 });
    let (status_code, media, _) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &media_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    let media = media.unwrap();
    assert_eq!(Some(12.5), media["x"].as_f64());
    assert_eq!(Some(-4.0), media["y"].as_f64());
    assert_eq!(Some(1.0), media["scale"].as_f64());
    assert_eq!(Some(90.0), media["rotation"].as_f64());

    // the page shows it
    let (_, page, _) = helper::single_page(&mut app, &access_token, &scrapbook_id, &page_id).await;
    assert_eq!(1, page.unwrap().media);

    // remove it
    let (status_code, _) = helper::maybe_delete_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &media_id,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, message) = helper::maybe_delete_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &media_id,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Media not found".to_string()), message);
}

#[tokio::test]
async fn test_invalid_media() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;

    // without blob key
    let payload = json!({
        "blobKey": " ",
        "url": "https://cdn.example.com/photos/beach.jpg",
        "width": 10,
        "height": 10,
    });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some(helper::Error {
            error: "Invalid media".to_string(),
            details: Some("`blobKey` is required".to_string()),
        }),
        error
    );

    // scale must be positive
    let payload = json!({
        "blobKey": "photos/beach.jpg",
        "url": "https://cdn.example.com/photos/beach.jpg",
        "width": 10,
        "height": 10,
        "scale": 0,
    });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "media",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some(helper::Error {
            error: "Invalid transform".to_string(),
            details: Some("`scale` must be a positive number".to_string()),
        }),
        error
    );

    // unknown page
    let payload = json!({
        "blobKey": "photos/beach.jpg",
        "url": "https://cdn.example.com/photos/beach.jpg",
        "width": 10,
        "height": 10,
    });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &Uuid::new_v4(),
        "media",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Page not found".to_string(), error.unwrap().error);
}

#[tokio::test]
async fn test_stickers() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;

    let payload = json!({ "kind": "heart", "x": 100, "y": 40, "scale": 1.5 });
    let (status_code, sticker, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let sticker = sticker.unwrap();
    assert_eq!(Some("heart"), sticker["kind"].as_str());
    assert_eq!(Some(1.5), sticker["scale"].as_f64());
    let sticker_id = element_id(&sticker);

    // change the icon, keep the position
    let payload = json!({ "kind": "rainbow" });
    let (status_code, sticker, _) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &sticker_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    let sticker = sticker.unwrap();
    assert_eq!(Some("rainbow"), sticker["kind"].as_str());
    assert_eq!(Some(100.0), sticker["x"].as_f64());

    // the kind can not be cleared
    let payload = json!({ "kind": null });
    let (status_code, _, error) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &sticker_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some(helper::Error {
            error: "Invalid field".to_string(),
            details: Some("`kind` can not be null".to_string()),
        }),
        error
    );

    // unknown icon
    let payload = json!({ "kind": "dragon" });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Data error".to_string(), error.unwrap().error);

    // without a transform
    let payload = json!({ "kind": "heart" });
    let (status_code, placed, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let placed = placed.unwrap();
    assert_eq!(Some(0.0), placed["x"].as_f64());
    assert_eq!(Some(0.0), placed["y"].as_f64());
    assert_eq!(Some(1.0), placed["scale"].as_f64());
    assert_eq!(Some(0.0), placed["rotation"].as_f64());

    let (status_code, _) = helper::maybe_delete_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &sticker_id,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    // a deleted sticker can not be changed
    let payload = json!({ "kind": "heart" });
    let (status_code, _, error) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &sticker_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Sticker not found".to_string(), error.unwrap().error);
}

#[tokio::test]
async fn test_texts() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;

    // defaults for font and color
    let payload = json!({ "text": "Our first trip" });
    let (status_code, text, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "texts",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let text = text.unwrap();
    assert_eq!(Some("Our first trip"), text["text"].as_str());
    assert_eq!(Some("handwriting"), text["font"].as_str());
    assert_eq!(Some("#1F1F1F"), text["color"].as_str());
    let text_id = element_id(&text);

    // restyle
    let payload = json!({ "font": "serif", "color": "#fff" });
    let (status_code, text, _) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "texts",
        &text_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    let text = text.unwrap();
    assert_eq!(Some("Our first trip"), text["text"].as_str());
    assert_eq!(Some("serif"), text["font"].as_str());
    assert_eq!(Some("#fff"), text["color"].as_str());

    // invalid color
    let payload = json!({ "color": "red" });
    let (status_code, _, error) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "texts",
        &text_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid color".to_string(), error.unwrap().error);

    // blank text
    let payload = json!({ "text": "   " });
    let (status_code, _, error) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "texts",
        &text_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Text is required".to_string(), error.unwrap().error);

    // too long
    let payload = json!({ "text": "a".repeat(2001) });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "texts",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Text is too long".to_string(), error.unwrap().error);
}

#[tokio::test]
async fn test_notes() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;

    let payload = json!({ "text": "Remember the sunset", "color": "pink", "x": 20 });
    let (status_code, note, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "notes",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let note = note.unwrap();
    assert_eq!(Some("pink"), note["color"].as_str());
    assert_eq!(Some(20.0), note["x"].as_f64());
    assert_eq!(Some(0.0), note["y"].as_f64());
    // notes only move
    assert!(note.get("scale").is_none());
    let note_id = element_id(&note);

    let payload = json!({ "text": "Remember the sunrise too", "y": 15 });
    let (status_code, note, _) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "notes",
        &note_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    let note = note.unwrap();
    assert_eq!(Some("Remember the sunrise too"), note["text"].as_str());
    assert_eq!(Some(20.0), note["x"].as_f64());
    assert_eq!(Some(15.0), note["y"].as_f64());

    // too long for a note
    let payload = json!({ "text": "a".repeat(501) });
    let (status_code, _, error) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "notes",
        &payload,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Text is too long".to_string(), error.unwrap().error);

    let (_, page, _) = helper::single_page(&mut app, &access_token, &scrapbook_id, &page_id).await;
    assert_eq!(1, page.unwrap().notes);
}

#[tokio::test]
async fn test_elements_of_other_pages() {
    let mut app = helper::setup_test_app();

    let (access_token, scrapbook_id, page_id) = setup_page(&mut app).await;
    let other_page = helper::create_page(&mut app, &access_token, &scrapbook_id).await;

    let payload = json!({ "kind": "star" });
    let (_, sticker, _) = helper::maybe_create_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &page_id,
        "stickers",
        &payload,
    )
    .await;
    let sticker_id = element_id(&sticker.unwrap());

    // the sticker is not on the other page
    let payload = json!({ "x": 5 });
    let (status_code, _, error) = helper::maybe_update_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &other_page.id,
        "stickers",
        &sticker_id,
        &payload,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Sticker not found".to_string(), error.unwrap().error);

    let (status_code, message) = helper::maybe_delete_element(
        &mut app,
        &access_token,
        &scrapbook_id,
        &other_page.id,
        "stickers",
        &sticker_id,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Sticker not found".to_string()), message);

    // deleting the page deletes its elements
    let (status_code, _) = helper::maybe_delete_page(&mut app, &access_token, &scrapbook_id, &page_id).await;
    assert_eq!(StatusCode::OK, status_code);

    let (_, pages, _) = helper::list_pages(&mut app, &access_token, &scrapbook_id).await;
    let pages = pages.unwrap();
    assert_eq!(1, pages.len());
    assert_eq!(0, pages[0].stickers);
}
