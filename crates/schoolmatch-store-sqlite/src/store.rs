//! [`SqliteStore`]: the SQLite implementation of [`ReviewStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use schoolmatch_core::{
  review::{AuthoredReview, NewReview, Review, ReviewId},
  school::{NewSchool, School, SchoolId},
  store::ReviewStore,
  user::{NewUser, User, UserId},
};

use crate::{
  Error, Result,
  encode::{
    AUTHORED_REVIEW_COLUMNS, REVIEW_COLUMNS, RawAuthoredReview, RawReview,
    RawSchool, RawUser, SCHOOL_COLUMNS, USER_COLUMNS, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

enum InsertOutcome {
  Inserted(i64),
  Duplicate,
  SchoolGone,
}

/// A SchoolMatch store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  async fn reviews_where(
    &self,
    predicate: &'static str,
    id: i64,
  ) -> Result<Vec<AuthoredReview>> {
    let raws: Vec<RawAuthoredReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AUTHORED_REVIEW_COLUMNS}
           FROM reviews r
           JOIN users u ON u.id = r.user_id
           WHERE {predicate} AND r.deleted_at IS NULL
           ORDER BY r.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawAuthoredReview::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthoredReview::into_authored).collect()
  }
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let at_str   = encode_dt(now);
    let username = input.username.clone();
    let email    = input.email.clone();
    let hash     = input.password_hash.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, email, password_hash, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![username, email, hash, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User {
      id:            UserId(id),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      created_at:    now,
      updated_at:    now,
    })
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL"),
            rusqlite::params![id.0],
            RawUser::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_username(&self, username: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND deleted_at IS NULL"
            ),
            rusqlite::params![username],
            RawUser::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Schools ───────────────────────────────────────────────────────────────

  async fn add_school(&self, input: NewSchool) -> Result<School> {
    let now = Utc::now();
    let at_str  = encode_dt(now);
    let name    = input.name.clone();
    let address = input.address.clone();
    let kind    = input.kind.clone();
    let owner   = input.owner_id.0;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schools (name, address, kind, user_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![name, address, kind, owner, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(School {
      id:         SchoolId(id),
      name:       input.name,
      address:    input.address,
      kind:       input.kind,
      owner_id:   input.owner_id,
      created_at: now,
      updated_at: now,
    })
  }

  async fn get_school(&self, id: SchoolId) -> Result<Option<School>> {
    let raw: Option<RawSchool> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = ?1 AND deleted_at IS NULL"
            ),
            rusqlite::params![id.0],
            RawSchool::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSchool::into_school).transpose()
  }

  async fn list_schools(&self) -> Result<Vec<School>> {
    let raws: Vec<RawSchool> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCHOOL_COLUMNS} FROM schools WHERE deleted_at IS NULL ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], RawSchool::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchool::into_school).collect()
  }

  async fn update_school(&self, school: School) -> Result<Option<School>> {
    let now = Utc::now();
    let at_str  = encode_dt(now);
    let name    = school.name.clone();
    let address = school.address.clone();
    let kind    = school.kind.clone();
    let id      = school.id.0;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE schools SET name = ?1, address = ?2, kind = ?3, updated_at = ?4
           WHERE id = ?5 AND deleted_at IS NULL",
          rusqlite::params![name, address, kind, at_str, id],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| School { updated_at: now, ..school }))
  }

  async fn soft_delete_school(&self, id: SchoolId) -> Result<bool> {
    let at_str = encode_dt(Utc::now());

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE schools SET deleted_at = ?1, updated_at = ?1
           WHERE id = ?2 AND deleted_at IS NULL",
          rusqlite::params![at_str, id.0],
        )?;
        if changed == 0 {
          // Dropping the transaction rolls it back.
          return Ok(false);
        }
        tx.execute(
          "UPDATE reviews SET deleted_at = ?1, updated_at = ?1
           WHERE school_id = ?2 AND deleted_at IS NULL",
          rusqlite::params![at_str, id.0],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn insert_review(&self, input: NewReview) -> Result<Review> {
    let now = Utc::now();
    let at_str  = encode_dt(now);
    let rating  = input.rating.value();
    let comment = input.comment.clone();
    let author  = input.author_id.0;
    let school  = input.school_id.0;

    // The checks and the insert share an IMMEDIATE transaction, so no other
    // writer can slip in between. The partial unique index backs this up.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let school_active: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM schools WHERE id = ?1 AND deleted_at IS NULL",
            [school],
            |r| r.get(0),
          )
          .optional()?;
        if school_active.is_none() {
          return Ok(InsertOutcome::SchoolGone);
        }
        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM reviews
             WHERE user_id = ?1 AND school_id = ?2 AND deleted_at IS NULL",
            rusqlite::params![author, school],
            |r| r.get(0),
          )
          .optional()?;
        if existing.is_some() {
          return Ok(InsertOutcome::Duplicate);
        }
        tx.execute(
          "INSERT INTO reviews (rating, comment, user_id, school_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![rating, comment, author, school, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(InsertOutcome::Inserted(id))
      })
      .await?;

    let id = match outcome {
      InsertOutcome::Inserted(id) => id,
      InsertOutcome::Duplicate => {
        return Err(Error::UniqueViolation(format!(
          "user {author} already has an active review of school {school}"
        )));
      }
      InsertOutcome::SchoolGone => return Err(Error::SchoolGone(school)),
    };

    Ok(Review {
      id:         ReviewId(id),
      rating:     input.rating,
      comment:    input.comment,
      author_id:  input.author_id,
      school_id:  input.school_id,
      created_at: now,
      updated_at: now,
    })
  }

  async fn find_active_review(
    &self,
    author: UserId,
    school: SchoolId,
  ) -> Result<Option<Review>> {
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {REVIEW_COLUMNS} FROM reviews
               WHERE user_id = ?1 AND school_id = ?2 AND deleted_at IS NULL"
            ),
            rusqlite::params![author.0, school.0],
            RawReview::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn get_review(&self, id: ReviewId) -> Result<Option<Review>> {
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1 AND deleted_at IS NULL"
            ),
            rusqlite::params![id.0],
            RawReview::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn get_review_with_author(&self, id: ReviewId) -> Result<Option<AuthoredReview>> {
    Ok(self.reviews_where("r.id = ?1", id.0).await?.into_iter().next())
  }

  async fn list_reviews(&self, school: SchoolId) -> Result<Vec<AuthoredReview>> {
    self.reviews_where("r.school_id = ?1", school.0).await
  }

  async fn update_review(&self, review: Review) -> Result<Option<Review>> {
    let now = Utc::now();
    let at_str  = encode_dt(now);
    let rating  = review.rating.value();
    let comment = review.comment.clone();
    let id      = review.id.0;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE reviews SET rating = ?1, comment = ?2, updated_at = ?3
           WHERE id = ?4 AND deleted_at IS NULL",
          rusqlite::params![rating, comment, at_str, id],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| Review { updated_at: now, ..review }))
  }

  async fn soft_delete_review(&self, id: ReviewId) -> Result<bool> {
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE reviews SET deleted_at = ?1, updated_at = ?1
           WHERE id = ?2 AND deleted_at IS NULL",
          rusqlite::params![at_str, id.0],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn average_rating(&self, school: SchoolId) -> Result<Option<f64>> {
    let mean: Option<f64> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT AVG(rating) FROM reviews WHERE school_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![school.0],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(mean)
  }

  async fn average_ratings(&self) -> Result<Vec<(SchoolId, f64)>> {
    let rows: Vec<(i64, f64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT r.school_id, AVG(r.rating)
           FROM reviews r
           JOIN schools s ON s.id = r.school_id
           WHERE r.deleted_at IS NULL AND s.deleted_at IS NULL
           GROUP BY r.school_id
           ORDER BY r.school_id",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().map(|(id, mean)| (SchoolId(id), mean)).collect())
  }
}
