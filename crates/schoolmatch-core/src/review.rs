//! Reviews: one rating per user per school.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  school::SchoolId,
  user::UserId,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReviewId(pub i64);

impl fmt::Display for ReviewId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<ReviewId> for i64 {
  fn from(id: ReviewId) -> Self { id.0 }
}

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A rating in the inclusive range `[1, 5]`. Fractional values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct Rating(f64);

impl Rating {
  pub const MIN: f64 = 1.0;
  pub const MAX: f64 = 5.0;

  pub fn new(value: f64) -> Result<Self> {
    if (Self::MIN..=Self::MAX).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::invalid(format!(
        "rating must be between {} and {}, got {value}",
        Self::MIN,
        Self::MAX
      )))
    }
  }

  pub fn value(self) -> f64 { self.0 }
}

impl From<Rating> for f64 {
  fn from(rating: Rating) -> Self { rating.0 }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A persisted, non-deleted review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
  pub id:         ReviewId,
  pub rating:     Rating,
  /// May be empty.
  pub comment:    String,
  /// The author. Never changes after creation.
  #[serde(rename = "user_id")]
  pub author_id:  UserId,
  pub school_id:  SchoolId,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::insert_review`].
#[derive(Debug, Clone)]
pub struct NewReview {
  pub rating:    Rating,
  pub comment:   String,
  pub author_id: UserId,
  pub school_id: SchoolId,
}

/// Request payload for creating a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
  pub rating:    f64,
  #[serde(default)]
  pub comment:   Option<String>,
  pub school_id: i64,
}

impl CreateReview {
  /// Validate the payload and stamp it with its author.
  pub fn into_new(self, author_id: UserId) -> Result<NewReview> {
    let rating = Rating::new(self.rating)?;
    if self.school_id <= 0 {
      return Err(Error::invalid("school_id must be a positive integer"));
    }
    Ok(NewReview {
      rating,
      comment: self.comment.unwrap_or_default(),
      author_id,
      school_id: SchoolId(self.school_id),
    })
  }
}

/// Partial update for a review. Omitted fields and an empty comment are
/// left alone; a rating outside `[1, 5]` rejects the whole patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
  pub rating:  Option<f64>,
  pub comment: Option<String>,
}

impl ReviewPatch {
  pub fn apply(self, review: &mut Review) -> Result<()> {
    let rating = self.rating.map(Rating::new).transpose()?;
    if let Some(rating) = rating {
      review.rating = rating;
    }
    if let Some(comment) = self.comment.filter(|c| !c.is_empty()) {
      review.comment = comment;
    }
    Ok(())
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// The public face of a review's author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
  pub id:       UserId,
  pub username: String,
}

/// A review with its author attached for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthoredReview {
  #[serde(flatten)]
  pub review: Review,
  pub user:   Author,
}
