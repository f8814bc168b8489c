//! Schools: the reviewable resource, owned by the user who created it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, review::AuthoredReview, user::UserId};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchoolId(pub i64);

impl fmt::Display for SchoolId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<SchoolId> for i64 {
  fn from(id: SchoolId) -> Self { id.0 }
}

/// A persisted, non-deleted school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct School {
  pub id:         SchoolId,
  pub name:       String,
  pub address:    String,
  /// Free-text category, e.g. "public" or "charter".
  #[serde(rename = "type")]
  pub kind:       String,
  /// The creator. Never changes after creation.
  #[serde(rename = "user_id")]
  pub owner_id:   UserId,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::add_school`].
#[derive(Debug, Clone)]
pub struct NewSchool {
  pub name:     String,
  pub address:  String,
  pub kind:     String,
  pub owner_id: UserId,
}

/// Request payload for creating a school. All fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchool {
  pub name:    String,
  pub address: String,
  #[serde(rename = "type")]
  pub kind:    String,
}

impl CreateSchool {
  /// Validate the payload and stamp it with its owner.
  pub fn into_new(self, owner_id: UserId) -> Result<NewSchool> {
    for (field, value) in
      [("name", &self.name), ("address", &self.address), ("type", &self.kind)]
    {
      if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} must not be empty")));
      }
    }
    Ok(NewSchool {
      name: self.name,
      address: self.address,
      kind: self.kind,
      owner_id,
    })
  }
}

/// Partial update for a school. Omitted or empty fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolPatch {
  pub name:    Option<String>,
  pub address: Option<String>,
  #[serde(rename = "type")]
  pub kind:    Option<String>,
}

impl SchoolPatch {
  pub fn apply(self, school: &mut School) {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(name) = present(self.name) {
      school.name = name;
    }
    if let Some(address) = present(self.address) {
      school.address = address;
    }
    if let Some(kind) = present(self.kind) {
      school.kind = kind;
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A school annotated with its average rating, computed on read.
#[derive(Debug, Clone, Serialize)]
pub struct RatedSchool {
  #[serde(flatten)]
  pub school:         School,
  pub average_rating: f64,
}

/// The detail view: a rated school with its active reviews.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolDetail {
  #[serde(flatten)]
  pub school:         School,
  pub average_rating: f64,
  pub reviews:        Vec<AuthoredReview>,
}
