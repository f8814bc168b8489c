//! SQL schema for the SchoolMatch SQLite store.
//!
//! Run as a single batch every time a store is opened; every statement is
//! safe to repeat against an existing database.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never physically removed; deleted_at marks a tombstone.
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL,          -- ISO 8601 UTC
    updated_at    TEXT NOT NULL,
    deleted_at    TEXT
);

CREATE TABLE IF NOT EXISTS schools (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    address     TEXT NOT NULL,
    kind        TEXT NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id),  -- owner, immutable
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS reviews (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    rating      REAL NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment     TEXT NOT NULL DEFAULT '',
    user_id     INTEGER NOT NULL REFERENCES users(id),    -- author, immutable
    school_id   INTEGER NOT NULL REFERENCES schools(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

-- One active review per (author, school); tombstoned rows do not count.
CREATE UNIQUE INDEX IF NOT EXISTS reviews_active_author_school_idx
    ON reviews(user_id, school_id) WHERE deleted_at IS NULL;

CREATE INDEX IF NOT EXISTS reviews_school_idx ON reviews(school_id);
CREATE INDEX IF NOT EXISTS schools_deleted_idx ON schools(deleted_at);
";
