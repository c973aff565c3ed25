#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

//! Datebook, the API behind a couples scrapbook app

use axum::Extension;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use api::JwtKeys;
pub use quests::QuestCache;

use crate::storage::Storage;

mod activity;
mod api;
pub mod coupon_expiry;
mod coupons;
pub mod graceful_shutdown;
pub mod layout;
mod pages;
pub mod password;
mod push_tokens;
mod quests;
mod relationships;
mod scrapbooks;
pub mod storage;
#[cfg(test)]
mod tests;
mod users;
pub mod utils;

/// Create the router for Datebook
pub fn create_router<S: Storage>(storage: S, jwt_keys: JwtKeys, quest_cache: QuestCache) -> Router {
    Router::new()
        .nest("/api", api::router::<S>())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
        .layer(Extension(quest_cache))
}
