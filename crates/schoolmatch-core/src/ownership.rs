//! Ownership guard.
//!
//! Ownership is the only authorization axis: a principal may update or
//! delete a resource iff it owns it. There are no roles and no override.

use std::fmt;

use crate::{
  Error, Resource, Result,
  identity::Principal,
  review::Review,
  school::School,
  user::UserId,
};

/// The verdict of [`authorize_owner_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Allow,
  Forbidden,
}

/// A mutation that only the owner may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Update,
  Delete,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Update => "update",
      Self::Delete => "delete",
    })
  }
}

/// Pure decision: allow iff the principal is the owner.
pub fn authorize_owner_action(owner: UserId, principal: &Principal) -> Access {
  if owner == principal.user_id() {
    Access::Allow
  } else {
    Access::Forbidden
  }
}

/// A resource with a single owning user.
pub trait Owned {
  const RESOURCE: Resource;

  fn owner_id(&self) -> UserId;

  /// [`authorize_owner_action`] lifted into the core error type.
  fn check_owner(&self, principal: &Principal, action: Action) -> Result<()> {
    match authorize_owner_action(self.owner_id(), principal) {
      Access::Allow => Ok(()),
      Access::Forbidden => {
        tracing::debug!(
          resource = %Self::RESOURCE,
          owner = %self.owner_id(),
          principal = %principal.user_id(),
          %action,
          "ownership check denied",
        );
        Err(Error::Forbidden(format!(
          "you can only {action} your own {}s",
          Self::RESOURCE
        )))
      }
    }
  }
}

impl Owned for School {
  const RESOURCE: Resource = Resource::School;

  fn owner_id(&self) -> UserId { self.owner_id }
}

impl Owned for Review {
  const RESOURCE: Resource = Resource::Review;

  fn owner_id(&self) -> UserId { self.author_id }
}
