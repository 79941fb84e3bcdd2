//! The persistence interface the seeder writes through.

use async_trait::async_trait;

use social::models::{
    Announcement, Comment, CommentBody, CommentReaction, CommentStats, Group, GroupDetail,
    GroupRule, GroupStats, Identity, Membership, ModeratorRecord, Post, PostBody, PostReaction,
    PostStats, Profile, Share,
};

use crate::error::SeedError;

/// Typed rows bound for one table.
#[derive(Debug, Clone)]
pub enum Batch {
    Identities(Vec<Identity>),
    Profiles(Vec<Profile>),
    Groups(Vec<Group>),
    GroupDetails(Vec<GroupDetail>),
    GroupStats(Vec<GroupStats>),
    Memberships(Vec<Membership>),
    Moderators(Vec<ModeratorRecord>),
    GroupRules(Vec<GroupRule>),
    Posts(Vec<Post>),
    PostBodies(Vec<PostBody>),
    PostStats(Vec<PostStats>),
    Shares(Vec<Share>),
    Announcements(Vec<Announcement>),
    Comments(Vec<Comment>),
    CommentBodies(Vec<CommentBody>),
    CommentStats(Vec<CommentStats>),
    PostReactions(Vec<PostReaction>),
    CommentReactions(Vec<CommentReaction>),
}

impl Batch {
    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        match self {
            Batch::Identities(rows) => rows.len(),
            Batch::Profiles(rows) => rows.len(),
            Batch::Groups(rows) => rows.len(),
            Batch::GroupDetails(rows) => rows.len(),
            Batch::GroupStats(rows) => rows.len(),
            Batch::Memberships(rows) => rows.len(),
            Batch::Moderators(rows) => rows.len(),
            Batch::GroupRules(rows) => rows.len(),
            Batch::Posts(rows) => rows.len(),
            Batch::PostBodies(rows) => rows.len(),
            Batch::PostStats(rows) => rows.len(),
            Batch::Shares(rows) => rows.len(),
            Batch::Announcements(rows) => rows.len(),
            Batch::Comments(rows) => rows.len(),
            Batch::CommentBodies(rows) => rows.len(),
            Batch::CommentStats(rows) => rows.len(),
            Batch::PostReactions(rows) => rows.len(),
            Batch::CommentReactions(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row type with a home table.
pub trait Table: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn into_batch(rows: Vec<Self>) -> Batch;
}

macro_rules! impl_table {
    ($($row:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl Table for $row {
                const NAME: &'static str = $name;

                fn into_batch(rows: Vec<Self>) -> Batch {
                    Batch::$variant(rows)
                }
            }
        )*
    };
}

impl_table! {
    Identity => Identities, "identities";
    Profile => Profiles, "profiles";
    Group => Groups, "groups";
    GroupDetail => GroupDetails, "group_details";
    GroupStats => GroupStats, "group_stats";
    Membership => Memberships, "memberships";
    ModeratorRecord => Moderators, "moderators";
    GroupRule => GroupRules, "group_rules";
    Post => Posts, "posts";
    PostBody => PostBodies, "post_bodies";
    PostStats => PostStats, "post_stats";
    Share => Shares, "shares";
    Announcement => Announcements, "announcements";
    Comment => Comments, "comments";
    CommentBody => CommentBodies, "comment_bodies";
    CommentStats => CommentStats, "comment_stats";
    PostReaction => PostReactions, "post_reactions";
    CommentReaction => CommentReactions, "comment_reactions";
}

/// Write-only store keyed by primary key.
///
/// `insert` stages rows, `flush` writes everything staged in order so later
/// rows in the same transaction can reference it, and `commit` flushes and
/// finalizes the transaction.
#[async_trait]
pub trait Store: Send {
    async fn insert(&mut self, batch: Batch) -> Result<(), SeedError>;

    async fn flush(&mut self) -> Result<(), SeedError>;

    async fn commit(&mut self) -> Result<(), SeedError>;
}
