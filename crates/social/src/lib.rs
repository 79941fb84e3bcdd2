//! Data model for the social graph.
//!
//! Every table is represented by one row type in [`models`]. Extension rows
//! (`*Detail`, `*Stats`, `*Body`, [`models::Share`], [`models::Announcement`])
//! share their primary key with the core row they extend and must be inserted
//! after it. The schema itself lives in `migrations/` and is exposed as
//! [`MIGRATOR`].

pub mod models;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
