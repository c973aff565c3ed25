//! Push token registration

use axum::Extension;
use serde::Deserialize;

use crate::push_tokens::Platform;
use crate::push_tokens::PushToken;
use crate::storage::RegisterPushTokenValues;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::Success;

fn parse_token(token: &str) -> Result<&str, Error> {
    let token = token.trim();

    if token.is_empty() {
        Err(Error::bad_request("Token is required"))
    } else {
        Ok(token)
    }
}

/// Register push token form
#[derive(Debug, Deserialize)]
pub struct RegisterPushTokenForm {
    token: String,
    platform: Platform,
}

/// Register the push token of a device for the current user
///
/// Registering the same token again is fine, a token of another user moves over
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "token": "ExponentPushToken[xxxx]", "platform": "ios" }' \
///     http://localhost:6000/api/push-tokens/register
/// ```
pub async fn register<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<RegisterPushTokenForm>,
) -> Result<Success<PushToken>, Error> {
    let values = RegisterPushTokenValues {
        token: parse_token(&form.token)?,
        platform: form.platform,
    };

    let push_token = storage
        .register_push_token(&current_user, &values)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok("pushToken", push_token))
}

/// Unregister push token form
#[derive(Debug, Deserialize)]
pub struct UnregisterPushTokenForm {
    token: String,
}

/// Remove a push token of the current user
///
/// Unknown tokens and tokens of other users are left alone
pub async fn unregister<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<UnregisterPushTokenForm>,
) -> Result<Success<()>, Error> {
    let removed = storage
        .delete_push_token(&current_user, parse_token(&form.token)?)
        .await
        .map_err(Error::internal_server_error)?;

    if !removed {
        tracing::debug!("No push token to unregister for user {}", current_user.id);
    }

    Ok(Success::done())
}
