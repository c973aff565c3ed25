//! Text boxes on a page

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::pages::DEFAULT_TEXT_COLOR;
use crate::pages::MAX_TEXT_LENGTH;
use crate::pages::PageText;
use crate::pages::TextFont;
use crate::pages::is_valid_color;
use crate::storage::Activity;
use crate::storage::CreateTextValues;
use crate::storage::Storage;
use crate::storage::UpdateTextValues;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::Patch;
use super::PathParameters;
use super::Success;
use super::transform::TransformForm;
use super::transform::UpdateTransformForm;
use super::utils::fetch_scrapbook_page;
use super::utils::parse_text;

fn parse_color(color: &str) -> Result<&str, Error> {
    if is_valid_color(color) {
        Ok(color)
    } else {
        Err(Error::bad_request("Invalid color").with_details("use `#RGB` or `#RRGGBB`"))
    }
}

/// Place text form
#[derive(Debug, Deserialize)]
pub struct CreateTextForm {
    text: String,
    #[serde(default)]
    font: TextFont,
    color: Option<String>,
    #[serde(flatten)]
    transform: TransformForm,
}

/// Place a text box on a page
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "text": "Best day ever", "font": "serif", "color": "#C2185B" }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages/<uuid>/texts
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
    Form(form): Form<CreateTextForm>,
) -> Result<Success<PageText>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let values = CreateTextValues {
        user: &current_user,
        text: parse_text(&form.text, MAX_TEXT_LENGTH)?,
        font: form.font,
        color: parse_color(form.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR))?,
        transform: form.transform.into_transform()?,
    };

    let text = storage
        .create_text(&page, &values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateText(&scrapbook, &text))
        .await;

    Ok(Success::created("text", text))
}

/// Change text form
#[derive(Debug, Deserialize)]
pub struct UpdateTextForm {
    #[serde(default)]
    text: Patch<String>,
    #[serde(default)]
    font: Patch<TextFont>,
    #[serde(default)]
    color: Patch<String>,
    #[serde(flatten)]
    transform: UpdateTransformForm,
}

/// Edit, restyle or move a text box
pub async fn update<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, text_id)): PathParameters<(Uuid, Uuid, Uuid)>,
    Form(form): Form<UpdateTextForm>,
) -> Result<Success<PageText>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let text = fetch_text(&storage, &page.id, &text_id).await?;

    let content = form.text.required("text")?;
    if let Some(ref content) = content {
        parse_text(content, MAX_TEXT_LENGTH)?;
    }

    let color = form.color.required("color")?;
    if let Some(ref color) = color {
        parse_color(color)?;
    }

    let values = UpdateTextValues {
        text: content,
        font: form.font.required("font")?,
        color,
        transform: form.transform.into_values()?,
    };

    let updated_text = storage
        .update_text(&text, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Text not found"))?;

    activity_log
        .register(Activity::UpdateText(&scrapbook, &updated_text))
        .await;

    Ok(Success::ok("text", updated_text))
}

/// Remove a text box from a page
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, text_id)): PathParameters<(Uuid, Uuid, Uuid)>,
) -> Result<Success<()>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let text = fetch_text(&storage, &page.id, &text_id).await?;

    storage
        .delete_text(&text)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeleteText(&scrapbook, &text))
        .await;

    Ok(Success::done())
}

async fn fetch_text<S: Storage>(
    storage: &S,
    page_id: &Uuid,
    text_id: &Uuid,
) -> Result<PageText, Error> {
    storage
        .find_single_text(page_id, text_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Text not found"))
}
