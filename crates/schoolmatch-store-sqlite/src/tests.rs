//! Integration tests for `SqliteStore` against an in-memory database, and
//! for the lifecycle manager running on top of it.

use std::sync::Arc;

use schoolmatch_core::{
  Error as CoreError, LifecycleManager, Principal,
  review::{CreateReview, NewReview, Rating, ReviewPatch},
  school::{CreateSchool, NewSchool, SchoolId, SchoolPatch},
  store::{ReviewStore, StoreError as _},
  user::{NewUser, User},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:      username.into(),
    email:         format!("{username}@example.com"),
    password_hash: "$argon2id$stub".into(),
  }
}

fn new_school(owner: &User, name: &str) -> NewSchool {
  NewSchool {
    name:     name.into(),
    address:  "1 Main St".into(),
    kind:     "public".into(),
    owner_id: owner.id,
  }
}

fn new_review(author: &User, school: SchoolId, rating: f64) -> NewReview {
  NewReview {
    rating:    Rating::new(rating).unwrap(),
    comment:   String::new(),
    author_id: author.id,
    school_id: school,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_user() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();

  let by_id = s.get_user(alice.id).await.unwrap().unwrap();
  assert_eq!(by_id.username, "alice");

  let by_name = s.find_user_by_username("alice".into()).await.unwrap().unwrap();
  assert_eq!(by_name.id, alice.id);
  assert_eq!(by_name.password_hash, "$argon2id$stub");

  assert!(s.find_user_by_username("bob".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_unique_violation() {
  let s = store().await;
  s.add_user(new_user("alice")).await.unwrap();

  let mut dup = new_user("alice");
  dup.email = "other@example.com".into();
  let err = s.add_user(dup).await.unwrap_err();
  assert!(err.is_unique_violation(), "{err}");
}

// ─── Schools ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_get_and_list_schools() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();

  let a = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  let b = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  assert_ne!(a.id, b.id, "duplicate names are allowed");

  let fetched = s.get_school(a.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Lincoln High");
  assert_eq!(fetched.owner_id, alice.id);

  let all = s.list_schools().await.unwrap();
  assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[tokio::test]
async fn update_school_never_changes_owner() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let bob = s.add_user(new_user("bob")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();

  let mut edited = school.clone();
  edited.name = "Lincoln Academy".into();
  edited.owner_id = bob.id;
  s.update_school(edited).await.unwrap().unwrap();

  let fetched = s.get_school(school.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Lincoln Academy");
  assert_eq!(fetched.owner_id, alice.id);
}

#[tokio::test]
async fn soft_delete_school_cascades_to_reviews() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let bob = s.add_user(new_user("bob")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  let review = s.insert_review(new_review(&bob, school.id, 4.0)).await.unwrap();

  assert!(s.soft_delete_school(school.id).await.unwrap());

  assert!(s.get_school(school.id).await.unwrap().is_none());
  assert!(s.get_review(review.id).await.unwrap().is_none());
  assert!(s.list_reviews(school.id).await.unwrap().is_empty());
  assert_eq!(s.average_rating(school.id).await.unwrap(), None);
  assert!(s.average_ratings().await.unwrap().is_empty());

  // Already gone.
  assert!(!s.soft_delete_school(school.id).await.unwrap());
  assert!(s.update_school(school).await.unwrap().is_none());
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_review_enforces_one_active_per_author() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();

  let first = s.insert_review(new_review(&alice, school.id, 4.0)).await.unwrap();
  let err = s
    .insert_review(new_review(&alice, school.id, 2.0))
    .await
    .unwrap_err();
  assert!(err.is_unique_violation());

  // A tombstoned review no longer blocks a new one.
  assert!(s.soft_delete_review(first.id).await.unwrap());
  let second = s.insert_review(new_review(&alice, school.id, 2.0)).await.unwrap();
  assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn insert_review_refuses_deleted_school() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let bob = s.add_user(new_user("bob")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  assert!(s.soft_delete_school(school.id).await.unwrap());

  let err = s
    .insert_review(new_review(&bob, school.id, 4.0))
    .await
    .unwrap_err();
  assert!(err.is_missing_school(), "{err}");
  assert!(!err.is_unique_violation());
  assert!(s.list_reviews(school.id).await.unwrap().is_empty());
  assert!(s.find_active_review(bob.id, school.id).await.unwrap().is_none());

  let err = s
    .insert_review(new_review(&bob, SchoolId(999), 4.0))
    .await
    .unwrap_err();
  assert!(err.is_missing_school(), "{err}");
}

#[tokio::test]
async fn concurrent_inserts_for_same_pair_admit_exactly_one() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();

  let attempts = (0..8).map(|i| {
    let s = s.clone();
    let input = new_review(&alice, school.id, 1.0 + f64::from(i % 5));
    tokio::spawn(async move { s.insert_review(input).await })
  });

  let mut ok = 0;
  for handle in attempts.collect::<Vec<_>>() {
    match handle.await.unwrap() {
      Ok(_) => ok += 1,
      Err(e) => assert!(e.is_unique_violation(), "{e}"),
    }
  }
  assert_eq!(ok, 1);
  assert_eq!(s.list_reviews(school.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reviews_carry_their_author() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let bob = s.add_user(new_user("bob")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  let review = s.insert_review(new_review(&bob, school.id, 5.0)).await.unwrap();

  let authored = s.get_review_with_author(review.id).await.unwrap().unwrap();
  assert_eq!(authored.user.username, "bob");
  assert_eq!(authored.review.rating.value(), 5.0);

  let listed = s.list_reviews(school.id).await.unwrap();
  assert_eq!(listed, vec![authored]);
}

#[tokio::test]
async fn update_review_persists_rating_and_comment() {
  let s = store().await;
  let alice = s.add_user(new_user("alice")).await.unwrap();
  let school = s.add_school(new_school(&alice, "Lincoln High")).await.unwrap();
  let mut review = s.insert_review(new_review(&alice, school.id, 4.0)).await.unwrap();

  review.rating = Rating::new(2.0).unwrap();
  review.comment = "went downhill".into();
  s.update_review(review.clone()).await.unwrap().unwrap();

  let fetched = s.get_review(review.id).await.unwrap().unwrap();
  assert_eq!(fetched.rating.value(), 2.0);
  assert_eq!(fetched.comment, "went downhill");
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn averages_cover_only_active_reviews() {
  let s = store().await;
  let users = [
    s.add_user(new_user("a")).await.unwrap(),
    s.add_user(new_user("b")).await.unwrap(),
    s.add_user(new_user("c")).await.unwrap(),
  ];
  let rated = s.add_school(new_school(&users[0], "Rated")).await.unwrap();
  let empty = s.add_school(new_school(&users[0], "Empty")).await.unwrap();

  s.insert_review(new_review(&users[0], rated.id, 5.0)).await.unwrap();
  s.insert_review(new_review(&users[1], rated.id, 2.0)).await.unwrap();
  let dropped = s.insert_review(new_review(&users[2], rated.id, 1.0)).await.unwrap();
  s.soft_delete_review(dropped.id).await.unwrap();

  assert_eq!(s.average_rating(rated.id).await.unwrap(), Some(3.5));
  assert_eq!(s.average_rating(empty.id).await.unwrap(), None);
  assert_eq!(s.average_ratings().await.unwrap(), vec![(rated.id, 3.5)]);

  // Repeated reads over an unchanged set agree exactly.
  for _ in 0..3 {
    assert_eq!(s.average_rating(rated.id).await.unwrap(), Some(3.5));
  }
}

// ─── Lifecycle manager over SQLite ───────────────────────────────────────────

async fn manager() -> LifecycleManager<SqliteStore> {
  LifecycleManager::new(Arc::new(store().await))
}

async fn register(m: &LifecycleManager<SqliteStore>, name: &str) -> Principal {
  Principal::new(m.register_user(new_user(name)).await.unwrap().id)
}

fn lincoln() -> CreateSchool {
  CreateSchool {
    name:    "Lincoln High".into(),
    address: "1 Main St".into(),
    kind:    "public".into(),
  }
}

fn rate(school: SchoolId, rating: f64) -> CreateReview {
  CreateReview { rating, comment: Some("ok".into()), school_id: school.0 }
}

#[tokio::test]
async fn lincoln_high_scenario() {
  let m = manager().await;
  let a = register(&m, "a").await;
  let b = register(&m, "b").await;
  let c = register(&m, "c").await;

  let created = m.create_school(&a, lincoln()).await.unwrap();
  assert_eq!(created.average_rating, 0.0);
  let lincoln = created.school.id;

  let b_review = m.create_review(&b, rate(lincoln, 4.0)).await.unwrap();
  assert_eq!(m.get_school(lincoln).await.unwrap().average_rating, 4.0);

  let err = m.create_review(&b, rate(lincoln, 5.0)).await.unwrap_err();
  assert!(matches!(err, CoreError::Conflict(_)), "{err}");

  m.create_review(&c, rate(lincoln, 2.0)).await.unwrap();
  let detail = m.get_school(lincoln).await.unwrap();
  assert_eq!(detail.average_rating, 3.0);
  assert_eq!(detail.reviews.len(), 2);

  let err = m.delete_review(&a, b_review.id).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)), "{err}");
}

#[tokio::test]
async fn rating_boundaries_on_create() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let low = register(&m, "low").await;
  let high = register(&m, "high").await;
  let school = m.create_school(&owner, lincoln()).await.unwrap().school.id;

  for bad in [0.0, 5.1] {
    let err = m.create_review(&low, rate(school, bad)).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)), "{bad}: {err}");
  }
  assert!(m.create_review(&low, rate(school, 1.0)).await.is_ok());
  assert!(m.create_review(&high, rate(school, 5.0)).await.is_ok());
  assert_eq!(m.get_school(school).await.unwrap().average_rating, 3.0);
}

#[tokio::test]
async fn review_for_missing_or_deleted_school_is_not_found() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let reviewer = register(&m, "reviewer").await;

  let err = m.create_review(&reviewer, rate(SchoolId(999), 3.0)).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { .. }));

  let school = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  m.delete_school(&owner, school).await.unwrap();
  let err = m.create_review(&reviewer, rate(school, 3.0)).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn only_owners_update_and_delete_schools() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let other = register(&m, "other").await;
  let school = m.create_school(&owner, lincoln()).await.unwrap().school.id;

  let patch = SchoolPatch { name: Some("Hijacked".into()), ..Default::default() };
  let err = m.update_school(&other, school, patch).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));
  let err = m.delete_school(&other, school).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));
  assert_eq!(m.get_school(school).await.unwrap().school.name, "Lincoln High");

  let patch = SchoolPatch {
    name:    Some("Lincoln Academy".into()),
    address: Some(String::new()),
    kind:    None,
  };
  let updated = m.update_school(&owner, school, patch).await.unwrap();
  assert_eq!(updated.school.name, "Lincoln Academy");
  assert_eq!(updated.school.address, "1 Main St");

  m.delete_school(&owner, school).await.unwrap();
  let err = m.get_school(school).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn only_authors_update_and_delete_reviews() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let author = register(&m, "author").await;
  let school = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  let review = m.create_review(&author, rate(school, 3.0)).await.unwrap();

  let patch = ReviewPatch { rating: Some(1.0), comment: None };
  let err = m.update_review(&owner, review.id, patch).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));

  let patch = ReviewPatch { rating: Some(4.5), comment: Some(String::new()) };
  let updated = m.update_review(&author, review.id, patch).await.unwrap();
  assert_eq!(updated.rating.value(), 4.5);
  assert_eq!(updated.comment, "ok");

  let patch = ReviewPatch { rating: Some(9.0), comment: None };
  let err = m.update_review(&author, review.id, patch).await.unwrap_err();
  assert!(matches!(err, CoreError::InvalidInput(_)));
  assert_eq!(m.get_review(review.id).await.unwrap().review.rating.value(), 4.5);

  m.delete_review(&author, review.id).await.unwrap();
  let err = m.get_review(review.id).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { .. }));
  assert_eq!(m.get_school(school).await.unwrap().average_rating, 0.0);
}

#[tokio::test]
async fn deleted_school_drops_out_of_listings_and_averages() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let reviewer = register(&m, "reviewer").await;
  let kept = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  let gone = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  m.create_review(&reviewer, rate(kept, 4.0)).await.unwrap();
  m.create_review(&reviewer, rate(gone, 1.0)).await.unwrap();

  m.delete_school(&owner, gone).await.unwrap();

  let listed = m.list_schools().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].school.id, kept);
  assert_eq!(listed[0].average_rating, 4.0);
  assert!(m.list_reviews(gone).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_schools_rates_every_school() {
  let m = manager().await;
  let owner = register(&m, "owner").await;
  let r1 = register(&m, "r1").await;
  let r2 = register(&m, "r2").await;
  let first = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  let second = m.create_school(&owner, lincoln()).await.unwrap().school.id;
  m.create_review(&r1, rate(first, 5.0)).await.unwrap();
  m.create_review(&r2, rate(first, 4.0)).await.unwrap();

  let listed: Vec<_> = m
    .list_schools()
    .await
    .unwrap()
    .into_iter()
    .map(|r| (r.school.id, r.average_rating))
    .collect();
  assert_eq!(listed, vec![(first, 4.5), (second, 0.0)]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let m = manager().await;
  register(&m, "alice").await;
  let err = m.register_user(new_user("alice")).await.unwrap_err();
  assert!(matches!(err, CoreError::Conflict(_)));
}
