//! The `ReviewStore` trait: the persistence port consumed by the core.
//!
//! The trait is implemented by storage backends (e.g.
//! `schoolmatch-store-sqlite`). The core never manages connections, pools or
//! retries; it only issues the calls below.
//!
//! Soft-deleted rows are invisible through every read method. Atomicity the
//! core relies on is pushed down here: [`ReviewStore::insert_review`] and
//! [`ReviewStore::soft_delete_school`] must each be all-or-nothing.

use std::future::Future;

use crate::{
  review::{AuthoredReview, NewReview, Review, ReviewId},
  school::{NewSchool, School, SchoolId},
  user::{NewUser, User, UserId},
};

/// Backend errors must say whether they are a unique-constraint violation
/// or a review insert whose school vanished; everything else is opaque to
/// the core.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_unique_violation(&self) -> bool;

  /// The target school was absent or soft-deleted when the review insert
  /// ran.
  fn is_missing_school(&self) -> bool;
}

/// Abstraction over a SchoolMatch persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReviewStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with a unique violation if the username or
  /// email is taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Schools ───────────────────────────────────────────────────────────

  fn add_school(
    &self,
    input: NewSchool,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Retrieve a non-deleted school. Returns `None` if absent or deleted.
  fn get_school(
    &self,
    id: SchoolId,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + '_;

  /// All non-deleted schools, ordered by id.
  fn list_schools(
    &self,
  ) -> impl Future<Output = Result<Vec<School>, Self::Error>> + Send + '_;

  /// Persist the mutable fields (name, address, type) of `school`. The
  /// owner is never written. Returns `None` if the row is absent or deleted.
  fn update_school(
    &self,
    school: School,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + '_;

  /// Soft-delete a school and every active review of it in one transaction.
  /// Returns `false` if the school was absent or already deleted.
  fn soft_delete_school(
    &self,
    id: SchoolId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Insert a review. The checks that the school is active and that the
  /// author has no active review of it are atomic with the insert; a
  /// duplicate fails with a unique violation, a vanished school with
  /// [`StoreError::is_missing_school`].
  fn insert_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// The active review by `author` on `school`, if any.
  fn find_active_review(
    &self,
    author: UserId,
    school: SchoolId,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn get_review(
    &self,
    id: ReviewId,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn get_review_with_author(
    &self,
    id: ReviewId,
  ) -> impl Future<Output = Result<Option<AuthoredReview>, Self::Error>> + Send + '_;

  /// Active reviews of a school with their authors, ordered by id.
  fn list_reviews(
    &self,
    school: SchoolId,
  ) -> impl Future<Output = Result<Vec<AuthoredReview>, Self::Error>> + Send + '_;

  /// Persist the mutable fields (rating, comment) of `review`. Returns
  /// `None` if the row is absent or deleted.
  fn update_review(
    &self,
    review: Review,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn soft_delete_review(
    &self,
    id: ReviewId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Mean rating over the active reviews of `school`; `None` when there are
  /// none. Computed by the backend in a single aggregate query.
  fn average_rating(
    &self,
    school: SchoolId,
  ) -> impl Future<Output = Result<Option<f64>, Self::Error>> + Send + '_;

  /// Mean rating for every non-deleted school that has at least one active
  /// review, in a single grouped query.
  fn average_ratings(
    &self,
  ) -> impl Future<Output = Result<Vec<(SchoolId, f64)>, Self::Error>> + Send + '_;
}
