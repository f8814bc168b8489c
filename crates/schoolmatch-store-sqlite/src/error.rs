//! Error type for `schoolmatch-store-sqlite`.

use schoolmatch_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A UNIQUE constraint or the active-review check refused a write.
  #[error("unique constraint violated: {0}")]
  UniqueViolation(String),

  /// The school a review targets is absent or soft-deleted.
  #[error("school {0} does not exist")]
  SchoolGone(i64),

  /// A stored value could not be turned back into a domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, msg))
        if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
      {
        Self::UniqueViolation(msg.unwrap_or_else(|| code.to_string()))
      }
      other => Self::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_unique_violation(&self) -> bool { matches!(self, Self::UniqueViolation(_)) }

  fn is_missing_school(&self) -> bool { matches!(self, Self::SchoolGone(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
