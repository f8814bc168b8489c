//! Core types and decision logic for the SchoolMatch review platform.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! decides who may act on which resource, keeps the one-review-per-school
//! invariant, and derives average ratings; persistence is reached only
//! through the [`store::ReviewStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod ownership;
pub mod rating;
pub mod review;
pub mod school;
pub mod store;
pub mod uniqueness;
pub mod user;

pub use error::{Error, Resource, Result};
pub use identity::{Identity, Principal};
pub use lifecycle::LifecycleManager;
