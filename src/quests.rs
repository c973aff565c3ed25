//! Quests
//!
//! Weekly and monthly goals of a relationship, computed from its activity

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::Utc;
use moka::future::Cache;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::activity::ActivityKind;

/// How long computed quests are served from the cache
const QUEST_CACHE_TTL: Duration = Duration::from_secs(60);

/// Upper bound of relationships kept in the cache
const QUEST_CACHE_CAPACITY: u64 = 10_000;

/// Period a quest resets on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestPeriod {
    /// Monday 00:00 UTC until the next Monday
    Weekly,
    /// First of the month 00:00 UTC until the first of the next month
    Monthly,
}

impl QuestPeriod {
    /// Start and end of the period containing `now`
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();

        let (start, end) = match self {
            QuestPeriod::Weekly => {
                let start =
                    today - TimeDelta::days(i64::from(today.weekday().num_days_from_monday()));

                (start, start + TimeDelta::days(7))
            }
            QuestPeriod::Monthly => {
                let start = first_of_month(today);

                // 32 days after the first always lands in the next month
                (start, first_of_month(start + TimeDelta::days(32)))
            }
        };

        (midnight(start), midnight(end))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(i64::from(date.day0()))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Static description of a quest
struct QuestDefinition {
    id: &'static str,
    period: QuestPeriod,
    title: &'static str,
    kind: ActivityKind,
    target: i64,
}

const QUESTS: [QuestDefinition; 5] = [
    QuestDefinition {
        id: "weekly-pages",
        period: QuestPeriod::Weekly,
        title: "Add 3 scrapbook pages",
        kind: ActivityKind::CreatePage,
        target: 3,
    },
    QuestDefinition {
        id: "weekly-stickers",
        period: QuestPeriod::Weekly,
        title: "Decorate with 5 stickers",
        kind: ActivityKind::CreateSticker,
        target: 5,
    },
    QuestDefinition {
        id: "weekly-redeem",
        period: QuestPeriod::Weekly,
        title: "Redeem a coupon",
        kind: ActivityKind::RedeemCoupon,
        target: 1,
    },
    QuestDefinition {
        id: "monthly-scrapbook",
        period: QuestPeriod::Monthly,
        title: "Start a new scrapbook",
        kind: ActivityKind::CreateScrapbook,
        target: 1,
    },
    QuestDefinition {
        id: "monthly-coupons",
        period: QuestPeriod::Monthly,
        title: "Issue 4 coupons",
        kind: ActivityKind::CreateCoupon,
        target: 4,
    },
];

/// Progress on a single quest
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: &'static str,
    pub period: QuestPeriod,
    pub title: &'static str,
    pub progress: i64,
    pub target: i64,
    pub completed: bool,
    pub period_end: DateTime<Utc>,
}

/// Activity counts per kind since the start of a period
pub type ActivityCounts = HashMap<ActivityKind, i64>;

/// Compute all quests at `now`
///
/// `weekly` and `monthly` hold the activity counted since the start of the current week and
/// month
pub fn compute(now: DateTime<Utc>, weekly: &ActivityCounts, monthly: &ActivityCounts) -> Vec<Quest> {
    QUESTS
        .iter()
        .map(|definition| {
            let counts = match definition.period {
                QuestPeriod::Weekly => weekly,
                QuestPeriod::Monthly => monthly,
            };

            let count = counts.get(&definition.kind).copied().unwrap_or(0);
            let (_, period_end) = definition.period.bounds(now);

            Quest {
                id: definition.id,
                period: definition.period,
                title: definition.title,
                progress: count.min(definition.target),
                target: definition.target,
                completed: count >= definition.target,
                period_end,
            }
        })
        .collect()
}

/// Short-lived cache of computed quests per relationship
///
/// Every invalidation bumps the generation of the relationship. Quests computed from activity
/// counted before the last invalidation are not cached.
#[derive(Clone)]
pub struct QuestCache {
    cache: Cache<Uuid, Vec<Quest>>,
    generations: Arc<Mutex<HashMap<Uuid, u64>>>,
}

impl QuestCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(QUEST_CACHE_CAPACITY)
                .time_to_live(QUEST_CACHE_TTL)
                .build(),
            generations: Arc::default(),
        }
    }

    pub async fn get(&self, relationship_id: &Uuid) -> Option<Vec<Quest>> {
        self.cache.get(relationship_id).await
    }

    /// The current generation, take it before counting activity
    pub async fn generation(&self, relationship_id: &Uuid) -> u64 {
        self.generations
            .lock()
            .await
            .get(relationship_id)
            .copied()
            .unwrap_or_default()
    }

    /// Cache quests computed at `generation`, unless the relationship was invalidated since
    ///
    /// Returns whether the quests were cached
    pub async fn insert(&self, relationship_id: Uuid, generation: u64, quests: Vec<Quest>) -> bool {
        let generations = self.generations.lock().await;

        if generations.get(&relationship_id).copied().unwrap_or_default() != generation {
            return false;
        }

        self.cache.insert(relationship_id, quests).await;

        true
    }

    /// Forget the quests of a relationship, its activity changed
    pub async fn invalidate(&self, relationship_id: &Uuid) {
        let mut generations = self.generations.lock().await;

        *generations.entry(*relationship_id).or_default() += 1;
        self.cache.invalidate(relationship_id).await;
    }
}

impl Default for QuestCache {
    fn default() -> Self {
        Self::new()
    }
}
