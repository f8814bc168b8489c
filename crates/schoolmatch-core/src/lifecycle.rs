//! Resource lifecycle manager.
//!
//! Orchestrates create/read/update/delete for schools and reviews, applying
//! the ownership guard, the uniqueness enforcer and the rating aggregator in
//! front of the [`ReviewStore`]. Mutating operations take a [`Principal`];
//! identity resolution happens before a call can be made at all.

use std::sync::Arc;

use crate::{
  Error, Resource, Result,
  identity::Principal,
  ownership::{Action, Owned as _},
  rating::RatingAggregator,
  review::{AuthoredReview, CreateReview, Review, ReviewId, ReviewPatch},
  school::{CreateSchool, RatedSchool, SchoolDetail, SchoolId, SchoolPatch},
  store::{ReviewStore, StoreError as _},
  uniqueness,
  user::{NewUser, User},
};

/// The single entry point for every operation on users, schools and reviews.
///
/// Cloning is cheap; the store handle is reference-counted.
pub struct LifecycleManager<S> {
  store: Arc<S>,
}

impl<S> Clone for LifecycleManager<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: ReviewStore> LifecycleManager<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  fn ratings(&self) -> RatingAggregator<'_, S> { RatingAggregator::new(&*self.store) }

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user whose password has already been hashed.
  pub async fn register_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;
    let user = self.store.add_user(input).await.map_err(|e| {
      if e.is_unique_violation() {
        Error::Conflict("username or email already registered".to_owned())
      } else {
        Error::storage(e)
      }
    })?;
    tracing::info!(user = %user.id, username = %user.username, "registered user");
    Ok(user)
  }

  /// Look up a user for credential validation.
  pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
    self
      .store
      .find_user_by_username(username.to_owned())
      .await
      .map_err(Error::storage)
  }

  pub async fn current_user(&self, principal: &Principal) -> Result<User> {
    let id = principal.user_id();
    self
      .store
      .get_user(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::User, id))
  }

  // ── Schools ───────────────────────────────────────────────────────────

  pub async fn create_school(
    &self,
    principal: &Principal,
    input: CreateSchool,
  ) -> Result<RatedSchool> {
    let new = input.into_new(principal.user_id())?;
    let school = self.store.add_school(new).await.map_err(Error::storage)?;
    tracing::info!(school = %school.id, owner = %school.owner_id, "created school");
    Ok(RatedSchool { school, average_rating: 0.0 })
  }

  /// A school with its average rating and active reviews.
  pub async fn get_school(&self, id: SchoolId) -> Result<SchoolDetail> {
    let school = self
      .store
      .get_school(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::School, id))?;
    let average_rating = self.ratings().average_rating(id).await?;
    let reviews = self.store.list_reviews(id).await.map_err(Error::storage)?;
    Ok(SchoolDetail { school, average_rating, reviews })
  }

  pub async fn list_schools(&self) -> Result<Vec<RatedSchool>> {
    let schools = self.store.list_schools().await.map_err(Error::storage)?;
    self.ratings().rate_all(schools).await
  }

  pub async fn update_school(
    &self,
    principal: &Principal,
    id: SchoolId,
    patch: SchoolPatch,
  ) -> Result<RatedSchool> {
    let mut school = self
      .store
      .get_school(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::School, id))?;
    school.check_owner(principal, Action::Update)?;

    patch.apply(&mut school);
    let school = self
      .store
      .update_school(school)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::School, id))?;

    let average_rating = self.ratings().average_rating(id).await?;
    Ok(RatedSchool { school, average_rating })
  }

  /// Soft-delete a school together with all of its reviews.
  pub async fn delete_school(&self, principal: &Principal, id: SchoolId) -> Result<()> {
    let school = self
      .store
      .get_school(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::School, id))?;
    school.check_owner(principal, Action::Delete)?;

    if !self.store.soft_delete_school(id).await.map_err(Error::storage)? {
      return Err(Error::not_found(Resource::School, id));
    }
    tracing::info!(school = %id, "deleted school and its reviews");
    Ok(())
  }

  // ── Reviews ───────────────────────────────────────────────────────────

  pub async fn create_review(
    &self,
    principal: &Principal,
    input: CreateReview,
  ) -> Result<Review> {
    let new = input.into_new(principal.user_id())?;

    self
      .store
      .get_school(new.school_id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::School, new.school_id))?;
    uniqueness::check_can_create(&*self.store, new.author_id, new.school_id).await?;

    let school_id = new.school_id;
    let review = self
      .store
      .insert_review(new)
      .await
      .map_err(|e| uniqueness::insert_error(e, school_id))?;
    tracing::info!(
      review = %review.id,
      school = %review.school_id,
      author = %review.author_id,
      "created review",
    );
    Ok(review)
  }

  pub async fn get_review(&self, id: ReviewId) -> Result<AuthoredReview> {
    self
      .store
      .get_review_with_author(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::Review, id))
  }

  /// Active reviews of a school. An unknown school simply has none.
  pub async fn list_reviews(&self, school: SchoolId) -> Result<Vec<AuthoredReview>> {
    self.store.list_reviews(school).await.map_err(Error::storage)
  }

  pub async fn update_review(
    &self,
    principal: &Principal,
    id: ReviewId,
    patch: ReviewPatch,
  ) -> Result<Review> {
    let mut review = self
      .store
      .get_review(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::Review, id))?;
    review.check_owner(principal, Action::Update)?;

    patch.apply(&mut review)?;
    self
      .store
      .update_review(review)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::Review, id))
  }

  pub async fn delete_review(&self, principal: &Principal, id: ReviewId) -> Result<()> {
    let review = self
      .store
      .get_review(id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(Resource::Review, id))?;
    review.check_owner(principal, Action::Delete)?;

    if !self.store.soft_delete_review(id).await.map_err(Error::storage)? {
      return Err(Error::not_found(Resource::Review, id));
    }
    Ok(())
  }
}
