//! Error types for `schoolmatch-core`.
//!
//! Every core operation surfaces exactly one of these variants. Transport
//! layers map them onto status codes; nothing here is retried.

use std::fmt;

use thiserror::Error;

/// The kind of entity an operation was addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  User,
  School,
  Review,
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::User => "user",
      Self::School => "school",
      Self::Review => "review",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("{resource} not found: {id}")]
  NotFound { resource: Resource, id: i64 },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The persistence engine failed for a reason opaque to the core.
  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(resource: Resource, id: impl Into<i64>) -> Self {
    Self::NotFound { resource, id: id.into() }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }

  /// Wrap a backend error without inspecting it.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
