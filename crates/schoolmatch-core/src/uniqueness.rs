//! Review uniqueness enforcer.
//!
//! At most one active review per (author, school). The pre-check here gives
//! a clean error on the common path; the backend's atomic insert is what
//! actually holds the invariant under concurrency, and its unique violation
//! is reported as the same conflict.

use crate::{
  Error, Resource, Result,
  school::SchoolId,
  store::{ReviewStore, StoreError},
  user::UserId,
};

const DUPLICATE_REVIEW: &str =
  "you already have a review for this school, please update it instead";

/// Permit creation unless `author` already has an active review of `school`.
pub async fn check_can_create<S: ReviewStore>(
  store: &S,
  author: UserId,
  school: SchoolId,
) -> Result<()> {
  let existing = store
    .find_active_review(author, school)
    .await
    .map_err(Error::storage)?;
  match existing {
    Some(review) => {
      tracing::debug!(%author, %school, review = %review.id, "duplicate review rejected");
      Err(Error::Conflict(DUPLICATE_REVIEW.to_owned()))
    }
    None => Ok(()),
  }
}

/// Map an insert failure: unique violations become [`Error::Conflict`], a
/// school deleted since the pre-check is [`Error::NotFound`], anything else
/// is a storage failure.
pub fn insert_error<E: StoreError>(err: E, school: SchoolId) -> Error {
  if err.is_missing_school() {
    tracing::debug!(%school, "school deleted before the review insert");
    Error::not_found(Resource::School, school)
  } else if err.is_unique_violation() {
    tracing::debug!(error = %err, "review insert hit the uniqueness constraint");
    Error::Conflict(DUPLICATE_REVIEW.to_owned())
  } else {
    Error::storage(err)
  }
}
