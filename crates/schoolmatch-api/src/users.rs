//! Handlers for user endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Body: [`RegisterBody`]; returns 201 + user |
//! | `GET`  | `/me` | The authenticated user |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use schoolmatch_core::{
  LifecycleManager,
  store::ReviewStore,
  user::{NewUser, User},
};
use serde::Deserialize;

use crate::{
  auth::{Caller, hash_password},
  error::ApiError,
  extract::JsonBody,
};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub email:    String,
  pub password: String,
}

/// `POST /register`
pub async fn register<S>(
  State(manager): State<LifecycleManager<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + 'static,
{
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }
  let password_hash = hash_password(&body.password)?;

  let user = manager
    .register_user(NewUser {
      username: body.username,
      email: body.email,
      password_hash,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /me`
pub async fn me<S>(
  State(manager): State<LifecycleManager<S>>,
  Caller(identity): Caller,
) -> Result<Json<User>, ApiError>
where
  S: ReviewStore + 'static,
{
  let principal = identity.current_principal()?;
  Ok(Json(manager.current_user(&principal).await?))
}
