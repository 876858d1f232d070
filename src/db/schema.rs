//! Database schema and migrations for Cabinet.
//!
//! Migrations are applied in order when the database is opened.
//! The schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table. Accounts are managed by the auth service; files only
    // reference the id.
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL,
    name        TEXT NOT NULL,
    password    TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_email_nocase ON users(email COLLATE NOCASE);
"#,
    // v2: per-owner folders
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_user_id ON folders(user_id);
"#,
    // v3: file metadata
    r#"
CREATE TABLE files (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    stored_name     TEXT NOT NULL UNIQUE,
    original_name   TEXT NOT NULL,
    mime_type       TEXT NOT NULL,
    size            INTEGER NOT NULL,
    location        TEXT NOT NULL,
    description     TEXT,
    is_public       INTEGER NOT NULL DEFAULT 0,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    folder_id       INTEGER REFERENCES folders(id) ON DELETE SET NULL,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_user_id ON files(user_id);
CREATE INDEX idx_files_folder_id ON files(folder_id);
CREATE INDEX idx_files_public_created ON files(is_public, created_at);
"#,
];
