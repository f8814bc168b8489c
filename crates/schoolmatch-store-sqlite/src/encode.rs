//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Ids are SQLite rowids.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use schoolmatch_core::{
  review::{Author, AuthoredReview, Rating, Review, ReviewId},
  school::{School, SchoolId},
  user::{User, UserId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "id, username, email, password_hash, created_at, updated_at";

pub const SCHOOL_COLUMNS: &str =
  "id, name, address, kind, user_id, created_at, updated_at";

/// Review columns joined with the author's username; expects aliases `r`, `u`.
pub const AUTHORED_REVIEW_COLUMNS: &str =
  "r.id, r.rating, r.comment, r.user_id, r.school_id, r.created_at, r.updated_at, u.username";

pub const REVIEW_COLUMNS: &str =
  "id, rating, comment, user_id, school_id, created_at, updated_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      created_at:    row.get(4)?,
      updated_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            UserId(self.id),
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `schools` row.
pub struct RawSchool {
  pub id:         i64,
  pub name:       String,
  pub address:    String,
  pub kind:       String,
  pub user_id:    i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawSchool {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      address:    row.get(2)?,
      kind:       row.get(3)?,
      user_id:    row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_school(self) -> Result<School> {
    Ok(School {
      id:         SchoolId(self.id),
      name:       self.name,
      address:    self.address,
      kind:       self.kind,
      owner_id:   UserId(self.user_id),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub id:         i64,
  pub rating:     f64,
  pub comment:    String,
  pub user_id:    i64,
  pub school_id:  i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawReview {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      rating:     row.get(1)?,
      comment:    row.get(2)?,
      user_id:    row.get(3)?,
      school_id:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    let rating = Rating::new(self.rating)
      .map_err(|e| Error::Decode(format!("review {}: {e}", self.id)))?;
    Ok(Review {
      id: ReviewId(self.id),
      rating,
      comment: self.comment,
      author_id: UserId(self.user_id),
      school_id: SchoolId(self.school_id),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A `reviews` row joined with its author's username.
pub struct RawAuthoredReview {
  pub review:   RawReview,
  pub username: String,
}

impl RawAuthoredReview {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { review: RawReview::read(row)?, username: row.get(7)? })
  }

  pub fn into_authored(self) -> Result<AuthoredReview> {
    let review = self.review.into_review()?;
    let user = Author { id: review.author_id, username: self.username };
    Ok(AuthoredReview { review, user })
  }
}
