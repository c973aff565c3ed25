//! Quest API

use axum::Extension;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::quests::Quest;
use crate::quests::QuestCache;
use crate::quests::QuestPeriod;
use crate::quests::compute;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;
use super::QueryParameters;
use super::Success;
use super::utils::resolve_relationship;

/// Filter for the quests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestsQuery {
    /// Defaults to the active relationship of the current user
    relationship_id: Option<Uuid>,
}

/// Get the weekly and monthly quests of a relationship
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/quests
/// ```
///
/// Response
/// ```json
/// { "ok": true, "quests": [{ "id": "weekly-pages", "period": "weekly", "progress": 1, "target": 3, ... }] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(quest_cache): Extension<QuestCache>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<QuestsQuery>,
) -> Result<Success<Vec<Quest>>, Error> {
    let relationship =
        resolve_relationship(&storage, query.relationship_id.as_ref(), &current_user).await?;

    if let Some(quests) = quest_cache.get(&relationship.id).await {
        return Ok(Success::ok("quests", quests));
    }

    let generation = quest_cache.generation(&relationship.id).await;

    let now = Utc::now();
    let (week_start, _) = QuestPeriod::Weekly.bounds(now);
    let (month_start, _) = QuestPeriod::Monthly.bounds(now);

    let weekly = storage
        .count_activity_since(&relationship.id, week_start)
        .await
        .map_err(Error::internal_server_error)?;

    let monthly = storage
        .count_activity_since(&relationship.id, month_start)
        .await
        .map_err(Error::internal_server_error)?;

    let quests = compute(now, &weekly, &monthly);

    quest_cache
        .insert(relationship.id, generation, quests.clone())
        .await;

    Ok(Success::ok("quests", quests))
}
