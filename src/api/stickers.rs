//! Stickers on a page

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::pages::PageSticker;
use crate::pages::StickerKind;
use crate::storage::Activity;
use crate::storage::CreateStickerValues;
use crate::storage::Storage;
use crate::storage::UpdateStickerValues;

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

/// Place sticker form
#[derive(Debug, Deserialize)]
pub struct CreateStickerForm {
    /// One of the available icons
    kind: StickerKind,
    #[serde(flatten)]
    transform: TransformForm,
}

/// Place a sticker on a page
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "kind": "heart", "x": 120, "y": 80, "scale": 1.5 }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages/<uuid>/stickers
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
    Form(form): Form<CreateStickerForm>,
) -> Result<Success<PageSticker>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let values = CreateStickerValues {
        user: &current_user,
        kind: form.kind,
        transform: form.transform.into_transform()?,
    };

    let sticker = storage
        .create_sticker(&page, &values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateSticker(&scrapbook, &sticker))
        .await;

    Ok(Success::created("sticker", sticker))
}

/// Change sticker form
#[derive(Debug, Deserialize)]
pub struct UpdateStickerForm {
    #[serde(default)]
    kind: Patch<StickerKind>,
    #[serde(flatten)]
    transform: UpdateTransformForm,
}

/// Swap the icon of a sticker or move it
pub async fn update<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, sticker_id)): PathParameters<(Uuid, Uuid, Uuid)>,
    Form(form): Form<UpdateStickerForm>,
) -> Result<Success<PageSticker>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let sticker = fetch_sticker(&storage, &page.id, &sticker_id).await?;

    let values = UpdateStickerValues {
        kind: form.kind.required("kind")?,
        transform: form.transform.into_values()?,
    };

    let updated_sticker = storage
        .update_sticker(&sticker, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Sticker not found"))?;

    activity_log
        .register(Activity::UpdateSticker(&scrapbook, &updated_sticker))
        .await;

    Ok(Success::ok("sticker", updated_sticker))
}

/// Peel a sticker off a page
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, sticker_id)): PathParameters<(Uuid, Uuid, Uuid)>,
) -> Result<Success<()>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let sticker = fetch_sticker(&storage, &page.id, &sticker_id).await?;

    storage
        .delete_sticker(&sticker)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeleteSticker(&scrapbook, &sticker))
        .await;

    Ok(Success::done())
}

async fn fetch_sticker<S: Storage>(
    storage: &S,
    page_id: &Uuid,
    sticker_id: &Uuid,
) -> Result<PageSticker, Error> {
    storage
        .find_single_sticker(page_id, sticker_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Sticker not found"))
}
