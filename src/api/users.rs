//! User API management

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::hash;
use crate::password::verify;
use crate::storage::ChangePasswordValues;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::User;
use crate::users::normalize_email;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;
use super::utils::MAX_SHORT_TEXT_LENGTH;
use super::utils::parse_short_text;

/// Minimal length of a password
const MIN_PASSWORD_LENGTH: usize = 8;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The email
    pub email: String,

    /// The display name
    pub display_name: String,

    /// Registered at
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn parse_email(email: &str) -> Result<String, Error> {
    let email = normalize_email(email);

    if !email.contains('@') {
        return Err(Error::bad_request("Invalid email"));
    }

    if email.chars().count() > MAX_SHORT_TEXT_LENGTH {
        return Err(Error::bad_request("Email is too long")
            .with_details(format!("at most {MAX_SHORT_TEXT_LENGTH} characters")));
    }

    Ok(email)
}

fn parse_password(password: &str) -> Result<&str, Error> {
    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(password)
    } else {
        Err(Error::bad_request("Password is too short")
            .with_details(format!("at least {MIN_PASSWORD_LENGTH} characters")))
    }
}

/// Register form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserForm {
    /// Email of the new user
    email: String,
    /// Password of the new user
    password: String,
    /// Name shown to partners
    display_name: String,
}

/// Register a new user
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "alex@example.com", "password": "verysecret", "displayName": "Alex" }' \
///     http://localhost:6000/api/users
/// ```
///
/// Response
/// ```json
/// { "ok": true, "user": { "id": "<uuid>", "email": "alex@example.com", ... } }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<CreateUserForm>,
) -> Result<Success<UserResponse>, Error> {
    let email = parse_email(&form.email)?;
    let password = parse_password(&form.password)?;

    let display_name = parse_short_text(&form.display_name, "Display name")?;

    let existing = storage
        .find_single_user_by_email(&email)
        .await
        .map_err(Error::internal_server_error)?;

    if existing.is_some() {
        return Err(Error::bad_request("User already exists"));
    }

    let hashed_password = hash(password).map_err(Error::internal_server_error)?;

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        email: &email,
        display_name,
        hashed_password: &hashed_password,
    };

    let user = storage
        .create_user(&values)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::info!("User {} registered", user.id);

    Ok(Success::created("user", UserResponse::from_user(&user)))
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Email of the user
    email: String,
    /// Password of the user
    password: String,
}

/// Get a token for a user "session"
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "alex@example.com", "password": "verysecret" }' \
///     http://localhost:6000/api/users/token
/// ```
///
/// Response
/// ```json
/// { "ok": true, "token": { "tokenType": "Bearer", "expiresIn": 3600, "accessToken": "some token" } }
/// ```
pub async fn token<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    let user = storage
        .find_single_user_by_email(&normalize_email(&form.email))
        .await
        .map_err(Error::internal_server_error)?;

    match user {
        Some(user) if verify(&user.hashed_password, &form.password) => {
            let token = generate_token(&jwt_keys, &user)?;

            Ok(Success::ok("token", token))
        }
        _ => Err(Error::bad_request("Invalid user")),
    }
}

/// Get the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/users/me
/// ```
pub async fn me<S: Storage>(current_user: CurrentUser<S>) -> Success<UserResponse> {
    Success::ok("user", UserResponse::from_user(&current_user))
}

/// Change password form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    /// Current password for verification
    current_password: String,
    /// New password
    password: String,
}

/// Change the password of the current user
///
/// Changing your password will invalidate your current access token
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "currentPassword": "verysecret", "password": "veryverysecret" }' \
///     http://localhost:6000/api/users/me/password
/// ```
///
/// Response
/// ```json
/// { "ok": true, "token": { "tokenType": "Bearer", "accessToken": "some token" } }
/// ```
pub async fn change_password<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Success<Token>, Error> {
    if !verify(&current_user.hashed_password, &form.current_password) {
        return Err(Error::bad_request("Invalid password"));
    }

    let password = parse_password(&form.password)?;
    let hashed_password = hash(password).map_err(Error::internal_server_error)?;

    let values = ChangePasswordValues {
        session_id: &Uuid::new_v4(),
        hashed_password: &hashed_password,
    };

    let updated_user = storage
        .change_password(&current_user, &values)
        .await
        .map_err(Error::internal_server_error)?;

    let token = generate_token(&jwt_keys, &updated_user)?;

    Ok(Success::ok("token", token))
}
