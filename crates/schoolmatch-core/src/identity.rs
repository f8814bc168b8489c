//! Identity context: who is performing the current operation.
//!
//! The core never derives identity itself. A credential validator upstream
//! resolves the caller and hands over an [`Identity`]; mutating operations
//! then demand a [`Principal`] by type, so an anonymous caller cannot reach
//! them at all.

use crate::{Error, Result, user::UserId};

/// An authenticated user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal(UserId);

impl Principal {
  /// Only credential validators should call this.
  pub fn new(user_id: UserId) -> Self { Self(user_id) }

  pub fn user_id(&self) -> UserId { self.0 }
}

/// The outcome of credential validation for one inbound operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Identity {
  Authenticated(Principal),
  #[default]
  Anonymous,
}

impl Identity {
  /// The resolved principal, or [`Error::Unauthenticated`].
  pub fn current_principal(&self) -> Result<Principal> {
    match self {
      Self::Authenticated(principal) => Ok(*principal),
      Self::Anonymous => Err(Error::Unauthenticated),
    }
  }
}
