//! JSON REST API for SchoolMatch.
//!
//! Exposes an axum [`Router`] backed by any [`schoolmatch_core::store::ReviewStore`].
//! Callers identify themselves with HTTP Basic credentials; anonymous callers
//! may only read. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", schoolmatch_api::api_router(manager.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod reviews;
pub mod schools;
pub mod users;

use axum::{
  Router,
  routing::{get, post},
};
use schoolmatch_core::{LifecycleManager, store::ReviewStore};

pub use error::ApiError;

/// Build a fully-materialised API router over `manager`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(manager: LifecycleManager<S>) -> Router<()>
where
  S: ReviewStore + 'static,
{
  Router::new()
    // Users
    .route("/register", post(users::register::<S>))
    .route("/me", get(users::me::<S>))
    // Schools
    .route("/schools", get(schools::list::<S>).post(schools::create::<S>))
    .route(
      "/schools/{id}",
      get(schools::get_one::<S>)
        .put(schools::update::<S>)
        .delete(schools::delete::<S>),
    )
    .route("/schools/{id}/reviews", get(reviews::list_for_school::<S>))
    // Reviews
    .route("/reviews", post(reviews::create::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>)
        .put(reviews::update::<S>)
        .delete(reviews::delete::<S>),
    )
    .with_state(manager)
}
