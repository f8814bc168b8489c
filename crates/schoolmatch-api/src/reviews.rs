//! Handlers for review endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/schools/:id/reviews` | Active reviews with authors |
//! | `POST`   | `/reviews` | Body: `{"rating","comment","school_id"}`; auth required |
//! | `GET`    | `/reviews/:id` | Single review with author |
//! | `PUT`    | `/reviews/:id` | Partial update; author only |
//! | `DELETE` | `/reviews/:id` | Soft-delete; author only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use schoolmatch_core::{
  LifecycleManager,
  review::{AuthoredReview, CreateReview, Review, ReviewId, ReviewPatch},
  school::SchoolId,
  store::ReviewStore,
};

use crate::{
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

/// `GET /schools/:id/reviews`
pub async fn list_for_school<S>(
  State(manager): State<LifecycleManager<S>>,
  PathParam(school_id): PathParam<i64>,
) -> Result<Json<Vec<AuthoredReview>>, ApiError>
where
  S: ReviewStore + 'static,
{
  Ok(Json(manager.list_reviews(SchoolId(school_id)).await?))
}

/// `POST /reviews` returns 201 + the stored review.
pub async fn create<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  JsonBody(body): JsonBody<CreateReview>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  let review = manager.create_review(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /reviews/:id`
pub async fn get_one<S>(
  State(manager): State<LifecycleManager<S>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<AuthoredReview>, ApiError>
where
  S: ReviewStore + 'static,
{
  Ok(Json(manager.get_review(ReviewId(id)).await?))
}

/// `PUT /reviews/:id`
pub async fn update<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  PathParam(id): PathParam<i64>,
  JsonBody(patch): JsonBody<ReviewPatch>,
) -> Result<Json<Review>, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  Ok(Json(manager.update_review(&principal, ReviewId(id), patch).await?))
}

/// `DELETE /reviews/:id` returns 204 on success.
pub async fn delete<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  manager.delete_review(&principal, ReviewId(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}
