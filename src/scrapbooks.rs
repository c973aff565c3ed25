//! Scrapbooks
//!
//! Shared books of a relationship, made of pages

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Maximum number of mood tags on a scrapbook or page
pub const MAX_MOOD_TAGS: usize = 10;

/// Cover image of a scrapbook
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    /// Key of the uploaded blob
    pub blob_key: String,

    /// Where the image can be downloaded
    pub url: String,

    /// Width in pixels
    pub width: i32,

    /// Height in pixels
    pub height: i32,
}

/// Date, place and mood of a scrapbook or a single page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// The day it happened
    pub date: Option<NaiveDate>,

    /// Free-form place name
    pub place: Option<String>,

    /// Identifier of the place with a places provider
    pub place_id: Option<String>,

    /// Short mood descriptions, like "cozy"
    pub mood_tags: Vec<String>,

    /// A few words looking back
    pub review: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scrapbook {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub created_by_user_id: Uuid,
    pub title: String,
    pub cover: Option<Cover>,
    pub details: Details,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize mood tags
///
/// Tags are trimmed and empty tags are dropped, returns `None` when there are too many tags
pub fn normalize_mood_tags(mood_tags: &[String]) -> Option<Vec<String>> {
    let mood_tags = mood_tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect::<Vec<String>>();

    if mood_tags.len() > MAX_MOOD_TAGS {
        None
    } else {
        Some(mood_tags)
    }
}
