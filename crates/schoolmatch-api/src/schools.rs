//! Handlers for `/schools` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/schools` | Every school with its `average_rating` |
//! | `POST`   | `/schools` | Body: `{"name","address","type"}`; auth required |
//! | `GET`    | `/schools/:id` | Detail view including active reviews |
//! | `PUT`    | `/schools/:id` | Partial update; owner only |
//! | `DELETE` | `/schools/:id` | Soft-deletes the school and its reviews; owner only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use schoolmatch_core::{
  LifecycleManager,
  school::{CreateSchool, RatedSchool, SchoolDetail, SchoolId, SchoolPatch},
  store::ReviewStore,
};

use crate::{
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

/// `GET /schools`
pub async fn list<S>(
  State(manager): State<LifecycleManager<S>>,
) -> Result<Json<Vec<RatedSchool>>, ApiError>
where
  S: ReviewStore + 'static,
{
  Ok(Json(manager.list_schools().await?))
}

/// `POST /schools` returns 201 + the new school, rated 0.
pub async fn create<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  JsonBody(body): JsonBody<CreateSchool>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  let school = manager.create_school(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(school)))
}

/// `GET /schools/:id`
pub async fn get_one<S>(
  State(manager): State<LifecycleManager<S>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<SchoolDetail>, ApiError>
where
  S: ReviewStore + 'static,
{
  Ok(Json(manager.get_school(SchoolId(id)).await?))
}

/// `PUT /schools/:id`
pub async fn update<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  PathParam(id): PathParam<i64>,
  JsonBody(patch): JsonBody<SchoolPatch>,
) -> Result<Json<RatedSchool>, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  Ok(Json(manager.update_school(&principal, SchoolId(id), patch).await?))
}

/// `DELETE /schools/:id` returns 204 on success.
pub async fn delete<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  manager.delete_school(&principal, SchoolId(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}
