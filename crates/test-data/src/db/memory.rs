//! In-memory [`Store`] for dry runs and tests.
//!
//! Rows become visible only on `flush`, and every flush checks the same
//! keys and references the SQL schema enforces.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use uuid::Uuid;

use social::models::{
    Announcement, Comment, CommentBody, CommentReaction, CommentStats, Group, GroupDetail,
    GroupRule, GroupStats, Identity, Membership, ModeratorRecord, Post, PostBody, PostReaction,
    PostStats, Profile, Share,
};

use crate::db::store::{Batch, Store};
use crate::error::SeedError;

/// Flushed rows, one vector per table.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub identities: Vec<Identity>,
    pub profiles: Vec<Profile>,
    pub groups: Vec<Group>,
    pub group_details: Vec<GroupDetail>,
    pub group_stats: Vec<GroupStats>,
    pub memberships: Vec<Membership>,
    pub moderators: Vec<ModeratorRecord>,
    pub group_rules: Vec<GroupRule>,
    pub posts: Vec<Post>,
    pub post_bodies: Vec<PostBody>,
    pub post_stats: Vec<PostStats>,
    pub shares: Vec<Share>,
    pub announcements: Vec<Announcement>,
    pub comments: Vec<Comment>,
    pub comment_bodies: Vec<CommentBody>,
    pub comment_stats: Vec<CommentStats>,
    pub post_reactions: Vec<PostReaction>,
    pub comment_reactions: Vec<CommentReaction>,
}

impl Tables {
    /// Total rows across all tables.
    pub fn row_count(&self) -> usize {
        self.identities.len()
            + self.profiles.len()
            + self.groups.len()
            + self.group_details.len()
            + self.group_stats.len()
            + self.memberships.len()
            + self.moderators.len()
            + self.group_rules.len()
            + self.posts.len()
            + self.post_bodies.len()
            + self.post_stats.len()
            + self.shares.len()
            + self.announcements.len()
            + self.comments.len()
            + self.comment_bodies.len()
            + self.comment_stats.len()
            + self.post_reactions.len()
            + self.comment_reactions.len()
    }
}

#[derive(Debug, Default)]
struct Keys {
    identities: HashSet<Uuid>,
    emails: HashSet<String>,
    phones: HashSet<String>,
    profiles: HashSet<Uuid>,
    groups: HashSet<Uuid>,
    group_details: HashSet<Uuid>,
    group_stats: HashSet<Uuid>,
    memberships: HashSet<(Uuid, Uuid)>,
    moderators: HashSet<(Uuid, Uuid)>,
    group_rules: HashSet<Uuid>,
    posts: HashSet<Uuid>,
    post_bodies: HashSet<Uuid>,
    post_stats: HashSet<Uuid>,
    shares: HashSet<Uuid>,
    announcements: HashSet<Uuid>,
    comments: HashSet<Uuid>,
    comment_bodies: HashSet<Uuid>,
    comment_stats: HashSet<Uuid>,
    post_reactions: HashSet<(Uuid, Uuid)>,
    comment_reactions: HashSet<(Uuid, Uuid)>,
}

/// A store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pending: Vec<Batch>,
    tables: Tables,
    keys: Keys,
    /// Posts applied by the flush in progress; extensions may not reference them.
    unflushed_posts: HashSet<Uuid>,
    flushes: usize,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows that have been flushed.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Number of batches staged but not yet flushed.
    pub fn pending_batches(&self) -> usize {
        self.pending.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    fn apply(&mut self, batch: Batch) -> Result<(), SeedError> {
        let keys = &mut self.keys;
        let tables = &mut self.tables;
        let unflushed_posts = &mut self.unflushed_posts;

        match batch {
            Batch::Identities(rows) => {
                for row in rows {
                    if row.role.implies_verified() && !row.is_verified {
                        return Err(violation(
                            "identities",
                            format!("{} has an elevated role but is unverified", row.id),
                        ));
                    }
                    if let Some(email) = &row.email {
                        unique(&mut keys.emails, email.clone(), "identities")?;
                    }
                    if let Some(phone) = &row.phone {
                        unique(&mut keys.phones, phone.clone(), "identities")?;
                    }
                    unique(&mut keys.identities, row.id, "identities")?;
                    tables.identities.push(row);
                }
            }
            Batch::Profiles(rows) => {
                for row in rows {
                    exists(&keys.identities, row.identity_id, "profiles", "identity")?;
                    unique(&mut keys.profiles, row.identity_id, "profiles")?;
                    tables.profiles.push(row);
                }
            }
            Batch::Groups(rows) => {
                for row in rows {
                    unique(&mut keys.groups, row.id, "groups")?;
                    tables.groups.push(row);
                }
            }
            Batch::GroupDetails(rows) => {
                for row in rows {
                    exists(&keys.groups, row.group_id, "group_details", "group")?;
                    exists(&keys.identities, row.creator_id, "group_details", "creator")?;
                    unique(&mut keys.group_details, row.group_id, "group_details")?;
                    tables.group_details.push(row);
                }
            }
            Batch::GroupStats(rows) => {
                for row in rows {
                    exists(&keys.groups, row.group_id, "group_stats", "group")?;
                    unique(&mut keys.group_stats, row.group_id, "group_stats")?;
                    tables.group_stats.push(row);
                }
            }
            Batch::Memberships(rows) => {
                for row in rows {
                    exists(&keys.groups, row.group_id, "memberships", "group")?;
                    exists(&keys.identities, row.identity_id, "memberships", "identity")?;
                    unique(
                        &mut keys.memberships,
                        (row.group_id, row.identity_id),
                        "memberships",
                    )?;
                    tables.memberships.push(row);
                }
            }
            Batch::Moderators(rows) => {
                for row in rows {
                    exists(&keys.groups, row.group_id, "moderators", "group")?;
                    exists(&keys.identities, row.identity_id, "moderators", "identity")?;
                    unique(
                        &mut keys.moderators,
                        (row.group_id, row.identity_id),
                        "moderators",
                    )?;
                    tables.moderators.push(row);
                }
            }
            Batch::GroupRules(rows) => {
                for row in rows {
                    exists(&keys.groups, row.group_id, "group_rules", "group")?;
                    unique(&mut keys.group_rules, row.id, "group_rules")?;
                    tables.group_rules.push(row);
                }
            }
            Batch::Posts(rows) => {
                for row in rows {
                    exists(&keys.identities, row.author_id, "posts", "author")?;
                    exists(&keys.groups, row.group_id, "posts", "group")?;
                    unique(&mut keys.posts, row.id, "posts")?;
                    unflushed_posts.insert(row.id);
                    tables.posts.push(row);
                }
            }
            Batch::PostBodies(rows) => {
                for row in rows {
                    exists(&keys.posts, row.post_id, "post_bodies", "post")?;
                    unique(&mut keys.post_bodies, row.post_id, "post_bodies")?;
                    tables.post_bodies.push(row);
                }
            }
            Batch::PostStats(rows) => {
                for row in rows {
                    exists(&keys.posts, row.post_id, "post_stats", "post")?;
                    unique(&mut keys.post_stats, row.post_id, "post_stats")?;
                    tables.post_stats.push(row);
                }
            }
            Batch::Shares(rows) => {
                for row in rows {
                    if row.post_id == row.origin_post_id {
                        return Err(violation(
                            "shares",
                            format!("{} shares itself", row.post_id),
                        ));
                    }
                    exists(&keys.posts, row.post_id, "shares", "wrapper post")?;
                    flushed_before(unflushed_posts, row.post_id, "shares")?;
                    exists(&keys.posts, row.origin_post_id, "shares", "origin post")?;
                    exists(&keys.identities, row.sharer_id, "shares", "sharer")?;
                    exists(&keys.groups, row.group_id, "shares", "group")?;
                    unique(&mut keys.shares, row.post_id, "shares")?;
                    tables.shares.push(row);
                }
            }
            Batch::Announcements(rows) => {
                for row in rows {
                    if row.ends_at <= row.starts_at {
                        return Err(violation(
                            "announcements",
                            format!("{} ends before it starts", row.post_id),
                        ));
                    }
                    exists(&keys.posts, row.post_id, "announcements", "wrapper post")?;
                    flushed_before(unflushed_posts, row.post_id, "announcements")?;
                    unique(&mut keys.announcements, row.post_id, "announcements")?;
                    tables.announcements.push(row);
                }
            }
            Batch::Comments(rows) => {
                for row in rows {
                    if !row.has_valid_link() {
                        return Err(violation(
                            "comments",
                            format!("{} must reference exactly one of post or parent", row.id),
                        ));
                    }
                    exists(&keys.identities, row.author_id, "comments", "author")?;
                    if let Some(post_id) = row.post_id {
                        exists(&keys.posts, post_id, "comments", "post")?;
                    }
                    if let Some(parent_id) = row.parent_id {
                        exists(&keys.comments, parent_id, "comments", "parent")?;
                    }
                    unique(&mut keys.comments, row.id, "comments")?;
                    tables.comments.push(row);
                }
            }
            Batch::CommentBodies(rows) => {
                for row in rows {
                    exists(&keys.comments, row.comment_id, "comment_bodies", "comment")?;
                    unique(&mut keys.comment_bodies, row.comment_id, "comment_bodies")?;
                    tables.comment_bodies.push(row);
                }
            }
            Batch::CommentStats(rows) => {
                for row in rows {
                    exists(&keys.comments, row.comment_id, "comment_stats", "comment")?;
                    unique(&mut keys.comment_stats, row.comment_id, "comment_stats")?;
                    tables.comment_stats.push(row);
                }
            }
            Batch::PostReactions(rows) => {
                for row in rows {
                    exists(&keys.posts, row.post_id, "post_reactions", "post")?;
                    exists(&keys.identities, row.identity_id, "post_reactions", "identity")?;
                    unique(
                        &mut keys.post_reactions,
                        (row.post_id, row.identity_id),
                        "post_reactions",
                    )?;
                    tables.post_reactions.push(row);
                }
            }
            Batch::CommentReactions(rows) => {
                for row in rows {
                    exists(&keys.comments, row.comment_id, "comment_reactions", "comment")?;
                    exists(&keys.identities, row.identity_id, "comment_reactions", "identity")?;
                    unique(
                        &mut keys.comment_reactions,
                        (row.comment_id, row.identity_id),
                        "comment_reactions",
                    )?;
                    tables.comment_reactions.push(row);
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&mut self, batch: Batch) -> Result<(), SeedError> {
        if !batch.is_empty() {
            self.pending.push(batch);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SeedError> {
        self.flushes += 1;
        self.unflushed_posts.clear();
        for batch in std::mem::take(&mut self.pending) {
            self.apply(batch)?;
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SeedError> {
        self.flush().await?;
        self.commits += 1;
        Ok(())
    }
}

fn violation(table: &'static str, detail: String) -> SeedError {
    SeedError::Constraint { table, detail }
}

fn unique<K: Eq + Hash + Debug>(
    set: &mut HashSet<K>,
    key: K,
    table: &'static str,
) -> Result<(), SeedError> {
    let detail = format!("duplicate key {key:?}");
    if set.insert(key) {
        Ok(())
    } else {
        Err(violation(table, detail))
    }
}

fn flushed_before(
    unflushed_posts: &HashSet<Uuid>,
    post_id: Uuid,
    table: &'static str,
) -> Result<(), SeedError> {
    if unflushed_posts.contains(&post_id) {
        return Err(violation(
            table,
            format!("wrapper post {post_id} was not flushed before its extension"),
        ));
    }
    Ok(())
}

fn exists(
    set: &HashSet<Uuid>,
    id: Uuid,
    table: &'static str,
    what: &str,
) -> Result<(), SeedError> {
    if set.contains(&id) {
        Ok(())
    } else {
        Err(violation(table, format!("{what} {id} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social::models::{MemberRole, PostKind, Role};
    use time::OffsetDateTime;

    fn identity(email: Option<&str>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: email.map(str::to_owned),
            phone: None,
            password_hash: "x".into(),
            role: Role::Member,
            is_verified: false,
        }
    }

    fn group() -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "g".into(),
            category: None,
            is_private: false,
            icon_url: None,
        }
    }

    fn post(author_id: Uuid, group_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id,
            group_id,
            kind: PostKind::Text,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_rows_visible_after_flush() {
        let mut store = MemoryStore::new();
        store
            .insert(Batch::Identities(vec![identity(Some("a@example.com"))]))
            .await
            .unwrap();

        assert!(store.tables().identities.is_empty());
        assert_eq!(store.pending_batches(), 1);

        store.flush().await.unwrap();
        assert_eq!(store.tables().identities.len(), 1);
        assert_eq!(store.pending_batches(), 0);
        assert_eq!(store.commit_count(), 0);

        store.commit().await.unwrap();
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_membership_rejected() {
        let mut store = MemoryStore::new();
        let user = identity(None);
        let g = group();
        let membership = Membership {
            group_id: g.id,
            identity_id: user.id,
            joined_at: OffsetDateTime::now_utc(),
            role: MemberRole::Member,
        };

        store.insert(Batch::Identities(vec![user])).await.unwrap();
        store.insert(Batch::Groups(vec![g])).await.unwrap();
        store
            .insert(Batch::Memberships(vec![membership.clone(), membership]))
            .await
            .unwrap();

        let result = store.flush().await;
        assert!(matches!(
            result,
            Err(SeedError::Constraint {
                table: "memberships",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let mut store = MemoryStore::new();
        store
            .insert(Batch::Identities(vec![
                identity(Some("same@example.com")),
                identity(Some("same@example.com")),
            ]))
            .await
            .unwrap();

        assert!(store.flush().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_reference_rejected() {
        let mut store = MemoryStore::new();
        let g = group();
        store.insert(Batch::Groups(vec![g.clone()])).await.unwrap();
        store
            .insert(Batch::Posts(vec![post(Uuid::new_v4(), g.id)]))
            .await
            .unwrap();

        let err = store.flush().await.unwrap_err();
        assert!(err.to_string().contains("posts"));
    }

    #[tokio::test]
    async fn test_share_needs_flushed_wrapper() {
        let mut store = MemoryStore::new();
        let user = identity(None);
        let g = group();
        let origin = post(user.id, g.id);
        let wrapper = post(user.id, g.id);
        let share = Share {
            post_id: wrapper.id,
            origin_post_id: origin.id,
            sharer_id: user.id,
            group_id: g.id,
            created_at: wrapper.created_at,
        };

        store.insert(Batch::Identities(vec![user])).await.unwrap();
        store.insert(Batch::Groups(vec![g])).await.unwrap();
        store.insert(Batch::Posts(vec![origin])).await.unwrap();
        store.flush().await.unwrap();

        store.insert(Batch::Posts(vec![wrapper])).await.unwrap();
        store.flush().await.unwrap();
        store.insert(Batch::Shares(vec![share])).await.unwrap();
        store.commit().await.unwrap();

        assert_eq!(store.tables().shares.len(), 1);
        assert_eq!(store.tables().posts.len(), 2);
    }

    #[tokio::test]
    async fn test_extension_in_same_flush_as_wrapper_rejected() {
        let mut store = MemoryStore::new();
        let user = identity(None);
        let g = group();
        let origin = post(user.id, g.id);
        let wrapper = post(user.id, g.id);
        let share = Share {
            post_id: wrapper.id,
            origin_post_id: origin.id,
            sharer_id: user.id,
            group_id: g.id,
            created_at: wrapper.created_at,
        };

        store.insert(Batch::Identities(vec![user])).await.unwrap();
        store.insert(Batch::Groups(vec![g])).await.unwrap();
        store.insert(Batch::Posts(vec![origin])).await.unwrap();
        store.flush().await.unwrap();

        // Wrapper and share staged together, one flush
        store.insert(Batch::Posts(vec![wrapper])).await.unwrap();
        store.insert(Batch::Shares(vec![share])).await.unwrap();

        assert!(matches!(
            store.flush().await,
            Err(SeedError::Constraint {
                table: "shares",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_comment_link_enforced() {
        let mut store = MemoryStore::new();
        let user = identity(None);
        let orphan = Comment {
            id: Uuid::new_v4(),
            author_id: user.id,
            post_id: None,
            parent_id: None,
            created_at: OffsetDateTime::now_utc(),
        };

        store.insert(Batch::Identities(vec![user])).await.unwrap();
        store.insert(Batch::Comments(vec![orphan])).await.unwrap();

        assert!(matches!(
            store.flush().await,
            Err(SeedError::Constraint {
                table: "comments",
                ..
            })
        ));
    }
}
