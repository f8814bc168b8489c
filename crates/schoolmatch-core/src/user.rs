//! Users: the identities that own schools and author reviews.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<UserId> for i64 {
  fn from(id: UserId) -> Self { id.0 }
}

/// A registered user. Soft-deleted users are never returned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:            UserId,
  pub username:      String,
  pub email:         String,
  /// PHC string produced by argon2; never leaves the server.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::add_user`]. The password must
/// already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
}

impl NewUser {
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::invalid("username must not be empty"));
    }
    if !self.email.contains('@') {
      return Err(Error::invalid("email must be a valid address"));
    }
    if self.password_hash.is_empty() {
      return Err(Error::invalid("password must not be empty"));
    }
    Ok(())
  }
}
