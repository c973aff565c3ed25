//! Activity log service

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::quests::QuestCache;
use crate::storage::Activity;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;

/// Activity log service
///
/// Records what members do in their relationship, quests are computed from it
pub struct ActivityLog<S: Storage> {
    /// Storage in where the activity is saved
    storage: S,

    /// Computed quests that go stale with new activity
    quest_cache: QuestCache,

    /// The member responsible for the activity
    current_user: CurrentUser<S>,
}

impl<S: Storage> ActivityLog<S> {
    /// Register an entry on the activity log
    ///
    /// Failing to register is logged, the action itself already happened
    pub async fn register(&self, activity: Activity<'_>) {
        let result = self
            .storage
            .register_activity(&self.current_user, &activity)
            .await;

        if let Err(err) = result {
            tracing::error!("Could not register activity {:?}: {err}", activity.kind());
        }

        self.quest_cache
            .invalidate(&activity.relationship_id())
            .await;
    }
}

impl<B, S> FromRequestParts<B> for ActivityLog<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the storage"))?;

        let Extension(quest_cache) = parts
            .extract::<Extension<QuestCache>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the quest cache"))?;

        let current_user = CurrentUser::<S>::from_request_parts(parts, state).await?;

        Ok(ActivityLog {
            storage,
            quest_cache,
            current_user,
        })
    }
}
