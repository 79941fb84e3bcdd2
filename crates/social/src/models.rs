use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Only `Member`, `Verified` and `Admin` are handed out by the seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Member,
    Verified,
    Admin,
}

impl Role {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Member => "member",
            Role::Verified => "verified",
            Role::Admin => "admin",
        }
    }

    /// Verified and admin accounts always carry the verified flag.
    pub fn implies_verified(&self) -> bool {
        matches!(self, Role::Verified | Role::Admin)
    }
}

/// Role of an identity inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Moderator,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Moderator => "moderator",
        }
    }
}

/// What a group rule does when its pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Block,
    Flag,
}

impl RuleAction {
    pub const ALL: [RuleAction; 2] = [RuleAction::Block, RuleAction::Flag];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Block => "block",
            RuleAction::Flag => "flag",
        }
    }
}

/// Kind of a post. `Share` posts are wrappers carrying a [`Share`] extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Link,
    Share,
}

impl PostKind {
    /// Kinds an author can pick for an ordinary post.
    pub const AUTHORED: [PostKind; 2] = [PostKind::Text, PostKind::Link];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Text => "text",
            PostKind::Link => "link",
            PostKind::Share => "share",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
    Love,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 3] = [
        ReactionKind::Like,
        ReactionKind::Dislike,
        ReactionKind::Love,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
            ReactionKind::Love => "love",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementCategory {
    Announcement,
    Poll,
    Event,
}

impl AnnouncementCategory {
    pub const ALL: [AnnouncementCategory; 3] = [
        AnnouncementCategory::Announcement,
        AnnouncementCategory::Poll,
        AnnouncementCategory::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementCategory::Announcement => "announcement",
            AnnouncementCategory::Poll => "poll",
            AnnouncementCategory::Event => "event",
        }
    }
}

/// Authentication record of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
}

impl Identity {
    /// An identity may author posts and own groups when it is verified or
    /// reachable through at least one contact handle.
    pub fn is_eligible_poster(&self) -> bool {
        self.is_verified || self.email.is_some() || self.phone.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub identity_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_active: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub is_private: bool,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    pub group_id: Uuid,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub created_at: OffsetDateTime,
    pub tags: Option<String>,
}

/// Denormalized counters. Seeded once, not kept in sync with memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub group_id: Uuid,
    pub member_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: Uuid,
    pub identity_id: Uuid,
    pub joined_at: OffsetDateTime,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorRecord {
    pub group_id: Uuid,
    pub identity_id: Uuid,
    pub assigned_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRule {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub pattern: String,
    pub action: RuleAction,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Uuid,
    pub kind: PostKind,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostBody {
    pub post_id: Uuid,
    pub content: String,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStats {
    pub post_id: Uuid,
    pub likes: i32,
    pub dislikes: i32,
}

/// A post re-sharing another post. `post_id` is the wrapper post's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    pub post_id: Uuid,
    pub origin_post_id: Uuid,
    pub sharer_id: Uuid,
    pub group_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub post_id: Uuid,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub category: AnnouncementCategory,
    pub is_active: bool,
    pub subscriber_count: i32,
}

/// A comment hangs off either a post (root comment) or another comment (reply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.post_id.is_some() && self.parent_id.is_none()
    }

    /// Exactly one of `post_id` and `parent_id` is set.
    pub fn has_valid_link(&self) -> bool {
        self.post_id.is_some() != self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentBody {
    pub comment_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentStats {
    pub comment_id: Uuid,
    pub likes: i32,
    pub dislikes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostReaction {
    pub post_id: Uuid,
    pub identity_id: Uuid,
    pub kind: ReactionKind,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReaction {
    pub comment_id: Uuid,
    pub identity_id: Uuid,
    pub kind: ReactionKind,
    pub created_at: OffsetDateTime,
}
