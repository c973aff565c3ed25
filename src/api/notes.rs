//! Sticky notes on a page

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::pages::MAX_NOTE_LENGTH;
use crate::pages::NoteColor;
use crate::pages::PageNote;
use crate::storage::Activity;
use crate::storage::CreateNoteValues;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::Patch;
use super::PathParameters;
use super::Success;
use super::transform::parse_coordinate;
use super::utils::fetch_scrapbook_page;
use super::utils::parse_text;

/// Place note form
#[derive(Debug, Deserialize)]
pub struct CreateNoteForm {
    text: String,
    #[serde(default)]
    color: NoteColor,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

/// Stick a note on a page
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "text": "Remember the ice cream?", "color": "pink", "x": 40, "y": 300 }' \
///     http://localhost:6000/api/scrapbooks/<uuid>/pages/<uuid>/notes
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id)): PathParameters<(Uuid, Uuid)>,
    Form(form): Form<CreateNoteForm>,
) -> Result<Success<PageNote>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let values = CreateNoteValues {
        user: &current_user,
        text: parse_text(&form.text, MAX_NOTE_LENGTH)?,
        color: form.color,
        x: parse_coordinate(form.x, "x")?,
        y: parse_coordinate(form.y, "y")?,
    };

    let note = storage
        .create_note(&page, &values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateNote(&scrapbook, &note))
        .await;

    Ok(Success::created("note", note))
}

/// Change note form
#[derive(Debug, Deserialize)]
pub struct UpdateNoteForm {
    #[serde(default)]
    text: Patch<String>,
    #[serde(default)]
    color: Patch<NoteColor>,
    #[serde(default)]
    x: Patch<f64>,
    #[serde(default)]
    y: Patch<f64>,
}

/// Rewrite, recolor or move a note
pub async fn update<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, note_id)): PathParameters<(Uuid, Uuid, Uuid)>,
    Form(form): Form<UpdateNoteForm>,
) -> Result<Success<PageNote>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let note = fetch_note(&storage, &page.id, &note_id).await?;

    let text = form.text.required("text")?;
    if let Some(ref text) = text {
        parse_text(text, MAX_NOTE_LENGTH)?;
    }

    let values = UpdateNoteValues {
        text,
        color: form.color.required("color")?,
        x: form
            .x
            .required("x")?
            .map(|x| parse_coordinate(x, "x"))
            .transpose()?,
        y: form
            .y
            .required("y")?
            .map(|y| parse_coordinate(y, "y"))
            .transpose()?,
    };

    let updated_note = storage
        .update_note(&note, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Note not found"))?;

    activity_log
        .register(Activity::UpdateNote(&scrapbook, &updated_note))
        .await;

    Ok(Success::ok("note", updated_note))
}

/// Take a note off a page
pub async fn delete<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((scrapbook_id, page_id, note_id)): PathParameters<(Uuid, Uuid, Uuid)>,
) -> Result<Success<()>, Error> {
    let (scrapbook, page) =
        fetch_scrapbook_page(&storage, &scrapbook_id, &page_id, &current_user).await?;

    let note = fetch_note(&storage, &page.id, &note_id).await?;

    storage
        .delete_note(&note)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::DeleteNote(&scrapbook, &note))
        .await;

    Ok(Success::done())
}

async fn fetch_note<S: Storage>(
    storage: &S,
    page_id: &Uuid,
    note_id: &Uuid,
) -> Result<PageNote, Error> {
    storage
        .find_single_note(page_id, note_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Note not found"))
}
