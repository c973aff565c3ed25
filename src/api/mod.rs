//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;

use crate::storage::Storage;

pub use activity_log::ActivityLog;
pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::Patch;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::parse_url;
pub use response::Error;
pub use response::Success;

mod activity_log;
mod coupons;
mod current_user;
mod details;
mod media;
mod notes;
mod pages;
mod push_tokens;
mod quests;
mod relationships;
mod request;
mod response;
mod scrapbooks;
mod stickers;
mod texts;
mod transform;
mod users;
mod utils;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new()
        .route("/", post(users::create::<S>))
        .route("/token", post(users::token::<S>))
        .route("/me", get(users::me::<S>))
        .route("/me/password", put(users::change_password::<S>));

    let relationships = Router::new()
        .route("/", post(relationships::create::<S>))
        .route("/mine", get(relationships::mine::<S>))
        .route(
            "/invites",
            get(relationships::invites::<S>).post(relationships::invite::<S>),
        )
        .route("/join", post(relationships::join::<S>));

    let coupons = Router::new()
        .route("/", get(coupons::list::<S>).post(coupons::create::<S>))
        .route(
            "/{coupon}",
            get(coupons::single::<S>).delete(coupons::delete::<S>),
        )
        .route("/{coupon}/redeem", post(coupons::redeem::<S>));

    let pages = Router::new()
        .route("/", get(pages::list::<S>).post(pages::create::<S>))
        .route(
            "/{page}",
            get(pages::single::<S>).delete(pages::delete::<S>),
        )
        .route(
            "/{page}/details",
            get(pages::details::<S>).patch(pages::update_details::<S>),
        )
        .route("/{page}/media", post(media::create::<S>))
        .route(
            "/{page}/media/{media}",
            patch(media::update::<S>).delete(media::delete::<S>),
        )
        .route("/{page}/stickers", post(stickers::create::<S>))
        .route(
            "/{page}/stickers/{sticker}",
            patch(stickers::update::<S>).delete(stickers::delete::<S>),
        )
        .route("/{page}/texts", post(texts::create::<S>))
        .route(
            "/{page}/texts/{text}",
            patch(texts::update::<S>).delete(texts::delete::<S>),
        )
        .route("/{page}/notes", post(notes::create::<S>))
        .route(
            "/{page}/notes/{note}",
            patch(notes::update::<S>).delete(notes::delete::<S>),
        );

    let scrapbooks = Router::new()
        .route(
            "/",
            get(scrapbooks::list::<S>).post(scrapbooks::create::<S>),
        )
        .route(
            "/{scrapbook}",
            get(scrapbooks::single::<S>)
                .patch(scrapbooks::update::<S>)
                .delete(scrapbooks::delete::<S>),
        )
        .route(
            "/{scrapbook}/details",
            get(scrapbooks::details::<S>).patch(scrapbooks::update_details::<S>),
        )
        .nest("/{scrapbook}/pages", pages);

    let push_tokens = Router::new()
        .route("/register", post(push_tokens::register::<S>))
        .route("/unregister", post(push_tokens::unregister::<S>));

    let quests = Router::new().route("/", get(quests::list::<S>));

    Router::new()
        .nest("/users", users)
        .nest("/relationships", relationships)
        .nest("/coupons", coupons)
        .nest("/scrapbooks", scrapbooks)
        .nest("/push-tokens", push_tokens)
        .nest("/quests", quests)
}

/// Everything outside the known routes
pub async fn not_found() -> Error {
    Error::not_found("Not found")
}
