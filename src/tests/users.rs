use axum::http::StatusCode;

use crate::tests::helper;
use crate::tests::helper::PASSWORD;

#[tokio::test]
async fn test_register_and_login() {
    let mut app = helper::setup_test_app();

    // register with a mixed case email
    let (status_code, user, _) =
        helper::maybe_register(&mut app, " Alex@Example.com", PASSWORD, "Alex").await;
    assert_eq!(StatusCode::CREATED, status_code);
    let user = user.unwrap();
    assert_eq!("alex@example.com".to_string(), user.email);
    assert_eq!("Alex".to_string(), user.display_name);

    // register again
    let (status_code, _, message) =
        helper::maybe_register(&mut app, "alex@example.com", PASSWORD, "Alex").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("User already exists".to_string()), message);

    // login
    let (status_code, access_token, _) =
        helper::maybe_login(&mut app, "ALEX@example.com", PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);
    let access_token = access_token.unwrap();

    // current user
    let (status_code, me, _) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(user.id, me.unwrap().id);
}

#[tokio::test]
async fn test_invalid_registration() {
    let mut app = helper::setup_test_app();

    let (status_code, _, message) =
        helper::maybe_register(&mut app, "alex.example.com", PASSWORD, "Alex").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid email".to_string()), message);

    let (status_code, _, message) =
        helper::maybe_register(&mut app, "alex@example.com", "short", "Alex").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Password is too short".to_string()), message);

    let (status_code, _, message) =
        helper::maybe_register(&mut app, "alex@example.com", PASSWORD, "  ").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Display name is required".to_string()), message);

    let (status_code, _, message) =
        helper::maybe_register(&mut app, "alex@example.com", PASSWORD, &"A".repeat(256)).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Display name is too long".to_string()), message);

    let email = format!("{}@example.com", "a".repeat(250));
    let (status_code, _, message) =
        helper::maybe_register(&mut app, &email, PASSWORD, "Alex").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Email is too long".to_string()), message);
}

#[tokio::test]
async fn test_invalid_login() {
    let mut app = helper::setup_test_app();

    helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    // wrong password
    let (status_code, _, message) =
        helper::maybe_login(&mut app, "alex@example.com", "notthepassword").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid user".to_string()), message);

    // unknown user, same answer
    let (status_code, _, message) =
        helper::maybe_login(&mut app, "sam@example.com", PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid user".to_string()), message);
}

#[tokio::test]
async fn test_missing_or_invalid_token() {
    let mut app = helper::setup_test_app();

    let (status_code, _, message) = helper::current_user(&mut app, "").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Missing API token".to_string()), message);

    let (status_code, _, message) = helper::current_user(&mut app, "Bearer nope").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Invalid token".to_string()), message);
}

#[tokio::test]
async fn test_change_password() {
    let mut app = helper::setup_test_app();

    let (_, access_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    // wrong current password
    let (status_code, _, message) =
        helper::maybe_change_password(&mut app, &access_token, "notthepassword", "veryverysecret")
            .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid password".to_string()), message);

    // new password too short
    let (status_code, _, message) =
        helper::maybe_change_password(&mut app, &access_token, PASSWORD, "short").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Password is too short".to_string()), message);

    // change it
    let (status_code, new_access_token, _) =
        helper::maybe_change_password(&mut app, &access_token, PASSWORD, "veryverysecret").await;
    assert_eq!(StatusCode::OK, status_code);
    let new_access_token = new_access_token.unwrap();

    // the old token is no longer valid
    let (status_code, _, message) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Token expired".to_string()), message);

    // the new one is
    let (status_code, _, _) = helper::current_user(&mut app, &new_access_token).await;
    assert_eq!(StatusCode::OK, status_code);

    // login with the old password
    let (status_code, _, _) = helper::maybe_login(&mut app, "alex@example.com", PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    // login with the new password
    let (status_code, _, _) =
        helper::maybe_login(&mut app, "alex@example.com", "veryverysecret").await;
    assert_eq!(StatusCode::OK, status_code);
}
