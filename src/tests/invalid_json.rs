use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_invalid_json() {
    let mut app = helper::setup_test_app();

    let (_, access_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    // missing data
    let body = r"{}";
    let (status_code, error) =
        helper::maybe_create_scrapbook_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!("Data error".to_string(), error.error);
    assert!(
        error
            .details
            .unwrap()
            .starts_with("Failed to deserialize the JSON body into the target type")
    );

    // syntax error
    let body = r#"{"}"#;
    let (status_code, error) =
        helper::maybe_create_scrapbook_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!("JSON syntax error".to_string(), error.error);
    assert_eq!(
        Some("EOF while parsing a string at line 1 column 3".to_string()),
        error.details
    );

    // syntax error
    let body = r#"{"foo":{"bar":}}"#;
    let (status_code, error) =
        helper::maybe_create_scrapbook_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!("JSON syntax error".to_string(), error.error);
    assert_eq!(
        Some("foo: expected value at line 1 column 15".to_string()),
        error.details
    );

    // missing content type
    let body = r"{}";
    let (status_code, error) =
        helper::maybe_create_scrapbook_with_raw_body(&mut app, &access_token, body, false).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!(
        "Missing `application/json` content type".to_string(),
        error.error
    );
}

#[tokio::test]
async fn test_invalid_path_parameter() {
    let mut app = helper::setup_test_app();

    let (_, access_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    let (status_code, _, message) =
        helper::single_scrapbook_with_str(&mut app, &access_token, "not-a-uuid").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid path parameter".to_string()), message);
}

#[tokio::test]
async fn test_unknown_route() {
    let mut app = helper::setup_test_app();

    let (_, access_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    let (status_code, _, message) =
        helper::single_scrapbook_with_str(&mut app, &access_token, "a/b/c").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Not found".to_string()), message);
}
