//! Photos on a page

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::pages::MediaKind;
use crate::pages::PageMedia;
use crate::storage::Activity;
use crate::storage::CreateMediaValues;
use crate::storage::Storage;
use crate::storage::UpdateMediaValues;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::parse_url;
use super::transform::TransformForm;
use super::transform::UpdateTransformForm;
use super::utils::fetch_scrapbook_page;

/// Place photo form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaForm {
    #[serde(default)]
    kind: MediaKind,
    /// Key of the uploaded blob
    blob_key: String,
    url: String,
    width: i32,
    height: i32,
    #[serde(flatten)]
    transform: TransformForm,
}

/// Place a photo on a page
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "blobKey": "photos/1.jpg", "url": "https://cdn.example.com/photos/1.jpg", "width": 1200, "height": 800, "rotation": -4 }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages/<uuid>/media
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
    Form(form): Form<CreateMediaForm>,
) -> Result<Success<PageMedia>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let blob_key = form.blob_key.trim();
    if blob_key.is_empty() {
        return Err(Error::bad_request("Invalid media").with_details("`blobKey` is required"));
    }

    let url = parse_url(&form.url)?;

    if form.width <= 0 || form.height <= 0 {
        return Err(Error::bad_request("Invalid media")
            .with_details("`width` and `height` must be positive"));
    }

    let values = CreateMediaValues {
        user: &current_user,
        kind: form.kind,
        blob_key,
        url: url.as_str(),
        width: form.width,
        height: form.height,
        transform: form.transform.into_transform()?,
    };

    let media = storage
        .create_media(&page, &values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateMedia(&scrapbook, &media))
        .await;

    Ok(Success::created("media", media))
}

/// Move photo form, only the transform can change
#[derive(Debug, Deserialize)]
pub struct UpdateMediaForm {
    #[serde(flatten)]
    transform: UpdateTransformForm,
}

/// Move, scale or rotate a photo
pub async fn update<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, media_id)): PathParameters<(Uuid, Uuid, Uuid)>,
    Form(form): Form<UpdateMediaForm>,
) -> Result<Success<PageMedia>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let media = fetch_media(&storage, &page.id, &media_id).await?;

    let values = UpdateMediaValues {
        transform: form.transform.into_values()?,
    };

    let updated_media = storage
        .update_media(&media, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Media not found"))?;

    activity_log
        .register(Activity::UpdateMedia(&scrapbook, &updated_media))
        .await;

    Ok(Success::ok("media", updated_media))
}

/// Remove a photo from a page
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, media_id)): PathParameters<(Uuid, Uuid, Uuid)>,
) -> Result<Success<()>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let media = fetch_media(&storage, &page.id, &media_id).await?;

    storage
        .delete_media(&media)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeleteMedia(&scrapbook, &media))
        .await;

    Ok(Success::done())
}

async fn fetch_media<S: Storage>(
    storage: &S,
    page_id: &Uuid,
    media_id: &Uuid,
) -> Result<PageMedia, Error> {
    storage
        .find_single_media(page_id, media_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Media not found"))
}
