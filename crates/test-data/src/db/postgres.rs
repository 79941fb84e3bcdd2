//! Postgres-backed [`Store`].

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::query_builder::Separated;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::info;

use crate::db::store::{Batch, Store};
use crate::error::SeedError;

/// Tables in an order safe for deletion under foreign keys.
const TABLES_CHILD_FIRST: &[&str] = &[
    "comment_reactions",
    "post_reactions",
    "comment_stats",
    "comment_bodies",
    "comments",
    "announcements",
    "shares",
    "post_stats",
    "post_bodies",
    "posts",
    "group_rules",
    "moderators",
    "memberships",
    "group_stats",
    "group_details",
    "groups",
    "profiles",
    "identities",
];

/// Store writing through one open transaction at a time.
pub struct PgStore {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
    pending: Vec<Batch>,
}

impl PgStore {
    /// Creates a store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            tx: None,
            pending: Vec::new(),
        }
    }

    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, SeedError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("Connected to database");

        social::MIGRATOR.run(&pool).await?;
        info!("Schema is up to date");

        Ok(Self::new(pool))
    }

    /// Clears all seeded data.
    ///
    /// **WARNING**: This deletes all data from the tables. Use with caution.
    pub async fn clear_all(&self) -> Result<(), SeedError> {
        info!("Clearing all seeded data...");

        for table in TABLES_CHILD_FIRST {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.pool)
                .await?;
        }

        info!("All data cleared");
        Ok(())
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Postgres>, SeedError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(self.tx.insert(tx))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert(&mut self, batch: Batch) -> Result<(), SeedError> {
        if !batch.is_empty() {
            self.pending.push(batch);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SeedError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending);
        let tx = self.transaction().await?;
        for batch in &pending {
            write_batch(tx, batch).await?;
        }

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SeedError> {
        self.flush().await?;
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }
}

async fn insert_rows<'a, T, F>(
    conn: &mut PgConnection,
    head: &'static str,
    rows: &'a [T],
    bind: F,
) -> Result<(), SeedError>
where
    T: Sync,
    F: FnMut(Separated<'_, 'a, Postgres, &'static str>, &'a T) + Send,
{
    if rows.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<'a, Postgres> = QueryBuilder::new(head);
    builder.push_values(rows, bind);
    builder.build().execute(conn).await?;

    Ok(())
}

async fn write_batch(conn: &mut PgConnection, batch: &Batch) -> Result<(), SeedError> {
    match batch {
        Batch::Identities(rows) => {
            insert_rows(
                conn,
                "INSERT INTO identities (id, email, phone, password_hash, role, is_verified) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.id)
                        .push_bind(r.email.as_deref())
                        .push_bind(r.phone.as_deref())
                        .push_bind(r.password_hash.as_str())
                        .push_bind(r.role.as_str())
                        .push_bind(r.is_verified);
                },
            )
            .await
        }
        Batch::Profiles(rows) => {
            insert_rows(
                conn,
                "INSERT INTO profiles (identity_id, name, bio, location, avatar_url, created_at, last_active) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.identity_id)
                        .push_bind(r.name.as_str())
                        .push_bind(r.bio.as_deref())
                        .push_bind(r.location.as_deref())
                        .push_bind(r.avatar_url.as_deref())
                        .push_bind(r.created_at)
                        .push_bind(r.last_active);
                },
            )
            .await
        }
        Batch::Groups(rows) => {
            insert_rows(
                conn,
                "INSERT INTO groups (id, name, category, is_private, icon_url) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.id)
                        .push_bind(r.name.as_str())
                        .push_bind(r.category.as_deref())
                        .push_bind(r.is_private)
                        .push_bind(r.icon_url.as_deref());
                },
            )
            .await
        }
        Batch::GroupDetails(rows) => {
            insert_rows(
                conn,
                "INSERT INTO group_details (group_id, description, creator_id, created_at, tags) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.group_id)
                        .push_bind(r.description.as_deref())
                        .push_bind(r.creator_id)
                        .push_bind(r.created_at)
                        .push_bind(r.tags.as_deref());
                },
            )
            .await
        }
        Batch::GroupStats(rows) => {
            insert_rows(
                conn,
                "INSERT INTO group_stats (group_id, member_count) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.group_id).push_bind(r.member_count);
                },
            )
            .await
        }
        Batch::Memberships(rows) => {
            insert_rows(
                conn,
                "INSERT INTO memberships (group_id, identity_id, joined_at, role) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.group_id)
                        .push_bind(r.identity_id)
                        .push_bind(r.joined_at)
                        .push_bind(r.role.as_str());
                },
            )
            .await
        }
        Batch::Moderators(rows) => {
            insert_rows(
                conn,
                "INSERT INTO moderators (group_id, identity_id, assigned_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.group_id)
                        .push_bind(r.identity_id)
                        .push_bind(r.assigned_at);
                },
            )
            .await
        }
        Batch::GroupRules(rows) => {
            insert_rows(
                conn,
                "INSERT INTO group_rules (id, group_id, name, pattern, action, description) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.id)
                        .push_bind(r.group_id)
                        .push_bind(r.name.as_str())
                        .push_bind(r.pattern.as_str())
                        .push_bind(r.action.as_str())
                        .push_bind(r.description.as_deref());
                },
            )
            .await
        }
        Batch::Posts(rows) => {
            insert_rows(
                conn,
                "INSERT INTO posts (id, author_id, group_id, kind, created_at, updated_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.id)
                        .push_bind(r.author_id)
                        .push_bind(r.group_id)
                        .push_bind(r.kind.as_str())
                        .push_bind(r.created_at)
                        .push_bind(r.updated_at);
                },
            )
            .await
        }
        Batch::PostBodies(rows) => {
            insert_rows(
                conn,
                "INSERT INTO post_bodies (post_id, content, tags) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.post_id)
                        .push_bind(r.content.as_str())
                        .push_bind(r.tags.as_deref());
                },
            )
            .await
        }
        Batch::PostStats(rows) => {
            insert_rows(
                conn,
                "INSERT INTO post_stats (post_id, likes, dislikes) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.post_id)
                        .push_bind(r.likes)
                        .push_bind(r.dislikes);
                },
            )
            .await
        }
        Batch::Shares(rows) => {
            insert_rows(
                conn,
                "INSERT INTO shares (post_id, origin_post_id, sharer_id, group_id, created_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.post_id)
                        .push_bind(r.origin_post_id)
                        .push_bind(r.sharer_id)
                        .push_bind(r.group_id)
                        .push_bind(r.created_at);
                },
            )
            .await
        }
        Batch::Announcements(rows) => {
            insert_rows(
                conn,
                "INSERT INTO announcements (post_id, starts_at, ends_at, category, is_active, subscriber_count) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.post_id)
                        .push_bind(r.starts_at)
                        .push_bind(r.ends_at)
                        .push_bind(r.category.as_str())
                        .push_bind(r.is_active)
                        .push_bind(r.subscriber_count);
                },
            )
            .await
        }
        Batch::Comments(rows) => {
            insert_rows(
                conn,
                "INSERT INTO comments (id, author_id, post_id, parent_id, created_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.id)
                        .push_bind(r.author_id)
                        .push_bind(r.post_id)
                        .push_bind(r.parent_id)
                        .push_bind(r.created_at);
                },
            )
            .await
        }
        Batch::CommentBodies(rows) => {
            insert_rows(
                conn,
                "INSERT INTO comment_bodies (comment_id, content) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.comment_id).push_bind(r.content.as_str());
                },
            )
            .await
        }
        Batch::CommentStats(rows) => {
            insert_rows(
                conn,
                "INSERT INTO comment_stats (comment_id, likes, dislikes) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.comment_id)
                        .push_bind(r.likes)
                        .push_bind(r.dislikes);
                },
            )
            .await
        }
        Batch::PostReactions(rows) => {
            insert_rows(
                conn,
                "INSERT INTO post_reactions (post_id, identity_id, kind, created_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.post_id)
                        .push_bind(r.identity_id)
                        .push_bind(r.kind.as_str())
                        .push_bind(r.created_at);
                },
            )
            .await
        }
        Batch::CommentReactions(rows) => {
            insert_rows(
                conn,
                "INSERT INTO comment_reactions (comment_id, identity_id, kind, created_at) ",
                rows.as_slice(),
                |mut b, r| {
                    b.push_bind(r.comment_id)
                        .push_bind(r.identity_id)
                        .push_bind(r.kind.as_str())
                        .push_bind(r.created_at);
                },
            )
            .await
        }
    }
}
