//! Scrapbook API management

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::scrapbooks::Cover;
use crate::scrapbooks::Details;
use crate::scrapbooks::Scrapbook;
use crate::storage::Activity;
use crate::storage::CreateScrapbookValues;
use crate::storage::Storage;
use crate::storage::UpdateScrapbookValues;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::Patch;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::details::DetailsForm;
use super::details::UpdateDetailsForm;
use super::parse_url;
use super::utils::fetch_relationship;
use super::utils::fetch_scrapbook;
use super::utils::parse_title;
use super::utils::resolve_relationship;

/// Cover image form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverForm {
    blob_key: String,
    url: String,
    width: i32,
    height: i32,
}

impl CoverForm {
    /// Validate into a cover
    fn into_cover(self) -> Result<Cover, Error> {
        let blob_key = self.blob_key.trim();
        if blob_key.is_empty() {
            return Err(Error::bad_request("Invalid cover").with_details("`blobKey` is required"));
        }

        let url = parse_url(&self.url)?;

        if self.width <= 0 || self.height <= 0 {
            return Err(Error::bad_request("Invalid cover")
                .with_details("`width` and `height` must be positive"));
        }

        Ok(Cover {
            blob_key: blob_key.to_string(),
            url: url.to_string(),
            width: self.width,
            height: self.height,
        })
    }
}

/// Filter for listing scrapbooks
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListScrapbooksQuery {
    /// Defaults to the active relationship of the current user
    relationship_id: Option<Uuid>,
}

/// List the scrapbooks of a relationship, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/scrapbooks
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<ListScrapbooksQuery>,
) -> Result<Success<Vec<Scrapbook>>, Error> {
    let relationship =
        resolve_relationship(&storage, query.relationship_id.as_ref(), &current_user).await?;

    let scrapbooks = storage
        .find_all_scrapbooks_by_relationship(&relationship)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok("scrapbooks", scrapbooks))
}

/// Create scrapbook form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScrapbookForm {
    relationship_id: Uuid,
    title: String,
    cover: Option<CoverForm>,
    details: Option<DetailsForm>,
}

/// Create a scrapbook
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "relationshipId": "<uuid>", "title": "Summer in Lisbon", "details": { "moodTags": ["sunny"] } }' \
///     http://localhost:6000/api/scrapbooks
/// ```
///
/// Response
/// ```json
/// { "ok": true, "scrapbook": { "id": "<uuid>", "title": "Summer in Lisbon", "cover": null, ... } }
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateScrapbookForm>,
) -> Result<Success<Scrapbook>, Error> {
    let relationship = fetch_relationship(&storage, &form.relationship_id, &current_user).await?;

    let title = parse_title(&form.title)?;
    let cover = form.cover.map(CoverForm::into_cover).transpose()?;
    let details = match form.details {
        Some(details) => details.into_details()?,
        None => Details::default(),
    };

    let values = CreateScrapbookValues {
        relationship: &relationship,
        user: &current_user,
        title: &title,
        cover: cover.as_ref(),
        details: &details,
    };

    let scrapbook = storage
        .create_scrapbook(&values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateScrapbook(&scrapbook))
        .await;

    Ok(Success::created("scrapbook", scrapbook))
}

/// Get a single scrapbook
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
) -> Result<Success<Scrapbook>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    Ok(Success::ok("scrapbook", scrapbook))
}

/// Update scrapbook form, see [`Patch`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScrapbookForm {
    #[serde(default)]
    title: Patch<String>,
    /// `null` removes the cover
    #[serde(default)]
    cover: Patch<CoverForm>,
}

/// Update the title or cover of a scrapbook
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Autumn in Porto", "cover": null }' \
///     http://localhost:6000/api/scrapbooks/<uuid>
/// ```
pub async fn update<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
    Form(form): Form<UpdateScrapbookForm>,
) -> Result<Success<Scrapbook>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    let title = form
        .title
        .required("title")?
        .map(|title| parse_title(&title))
        .transpose()?;

    let cover = match form.cover.nullable() {
        Some(Some(cover)) => Some(Some(cover.into_cover()?)),
        Some(None) => Some(None),
        None => None,
    };

    let values = UpdateScrapbookValues { title, cover };

    let updated_scrapbook = storage
        .update_scrapbook(&scrapbook, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Scrapbook not found"))?;

    activity_log
        .register(Activity::UpdateScrapbook(&updated_scrapbook))
        .await;

    Ok(Success::ok("scrapbook", updated_scrapbook))
}

/// Delete a scrapbook with all of its pages
///
/// Request:
/// ```sh
/// curl -v -XDELETE -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/scrapbooks/<uuid>
/// ```
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
) -> Result<Success<()>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    storage
        .delete_scrapbook(&scrapbook)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeleteScrapbook(&scrapbook))
        .await;

    Ok(Success::done())
}

/// Get the details of a scrapbook
pub async fn details<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
) -> Result<Success<Details>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    Ok(Success::ok("details", scrapbook.details))
}

/// Update the details of a scrapbook
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "date": "2026-02-14", "place": null, "moodTags": ["cozy", "rainy"] }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/details
/// ```
pub async fn update_details<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
    Form(form): Form<UpdateDetailsForm>,
) -> Result<Success<Details>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    let values = form.into_values()?;

    let updated_scrapbook = storage
        .update_scrapbook_details(&scrapbook, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Scrapbook not found"))?;

    activity_log
        .register(Activity::UpdateScrapbook(&updated_scrapbook))
        .await;

    Ok(Success::ok("details", updated_scrapbook.details))
}
