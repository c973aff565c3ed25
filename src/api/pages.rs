//! Page API management
//!
//! Pages live inside a scrapbook, their elements are managed by their own modules

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::pages::Page;
use crate::pages::PageElements;
use crate::scrapbooks::Details;
use crate::storage::Activity;
use crate::storage::CreatePageValues;
use crate::storage::Storage;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::details::DetailsForm;
use super::details::UpdateDetailsForm;
use super::utils::fetch_scrapbook;
use super::utils::fetch_scrapbook_page;

/// A page with everything placed on it
#[derive(Debug, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    page: Page,
    #[serde(flatten)]
    elements: PageElements,
}

async fn with_elements<S: Storage>(storage: &S, page: Page) -> Result<PageResponse, Error> {
    let elements = storage
        .find_page_elements(&page)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(PageResponse { page, elements })
}

/// List all pages of a scrapbook, ordered by page index
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
) -> Result<Success<Vec<PageResponse>>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    let pages = storage
        .find_all_pages_by_scrapbook(&scrapbook)
        .await
        .map_err(Error::internal_server_error)?;

    let mut responses = Vec::with_capacity(pages.len());
    for page in pages {
        responses.push(with_elements(&storage, page).await?);
    }

    Ok(Success::ok("pages", responses))
}

/// Create page form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageForm {
    details: Option<DetailsForm>,
}

/// Append a page to a scrapbook
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "details": { "place": "Harbor" } }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages
/// ```
///
/// Response
/// ```json
/// { "ok": true, "page": { "id": "<uuid>", "pageIndex": 0, "media": [], ... } }
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(scrapbook_id): PathParameters<Uuid>,
    Form(form): Form<CreatePageForm>,
) -> Result<Success<PageResponse>, Error> {
    let scrapbook = fetch_scrapbook(&storage, &scrapbook_id, &current_user).await?;

    let details = match form.details {
        Some(details) => details.into_details()?,
        None => Details::default(),
    };

    let page = storage
        .create_page(&scrapbook, &CreatePageValues { details: &details })
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreatePage(&scrapbook, &page))
        .await;

    Ok(Success::created(
        "page",
        PageResponse {
            page,
            elements: PageElements::default(),
        },
    ))
}

/// Get a single page with its elements
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
) -> Result<Success<PageResponse>, Error> {
    let (_, page) = fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    Ok(Success::ok("page", with_elements(&storage, page).await?))
}

/// Delete a page, later pages move up
///
/// Request:
/// ```sh
/// curl -v -XDELETE -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages/<uuid>
/// ```
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
) -> Result<Success<()>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    storage
        .delete_page(&page)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeletePage(&scrapbook, &page))
        .await;

    Ok(Success::done())
}

/// Get the details of a page
pub async fn details<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
) -> Result<Success<Details>, Error> {
    let (_, page) = fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    Ok(Success::ok("details", page.details))
}

/// Update the details of a page
pub async fn update_details<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
    Form(form): Form<UpdateDetailsForm>,
) -> Result<Success<Details>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let values = form.into_values()?;

    let updated_page = storage
        .update_page_details(&page, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Page not found"))?;

    activity_log
        .register(Activity::UpdatePage(&scrapbook, &updated_page))
        .await;

    Ok(Success::ok("details", updated_page.details))
}
