//! HTTP Basic credential validation: the source of the identity context.
//!
//! Credentials are checked against the users table with argon2. A request
//! without an `Authorization` header is anonymous; a request with a bad one
//! is rejected outright.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;
use schoolmatch_core::{Identity, LifecycleManager, Principal, store::ReviewStore};

use crate::error::ApiError;

/// The identity resolved for the current request.
pub struct Caller(pub Identity);

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(hash).map_err(|_| ApiError::Unauthenticated)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthenticated)
}

/// Split a `Basic` authorization header into username and password.
fn parse_basic(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthenticated)?;
  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthenticated)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthenticated)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthenticated)?;

  Ok(Some((username.to_owned(), password.to_owned())))
}

/// Resolve the request's identity from its headers.
pub async fn resolve_identity<S>(
  headers: &HeaderMap,
  manager: &LifecycleManager<S>,
) -> Result<Identity, ApiError>
where
  S: ReviewStore,
{
  let Some((username, password)) = parse_basic(headers)? else {
    return Ok(Identity::Anonymous);
  };

  let user = manager.find_user(&username).await?.ok_or_else(|| {
    tracing::debug!(%username, "unknown user");
    ApiError::Unauthenticated
  })?;
  verify_password(&password, &user.password_hash)?;

  Ok(Identity::Authenticated(Principal::new(user.id)))
}

impl<S> FromRequestParts<LifecycleManager<S>> for Caller
where
  S: ReviewStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &LifecycleManager<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_identity(&parts.headers, state).await.map(Caller)
  }
}
