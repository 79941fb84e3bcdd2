//! Entity generators for the social graph.
//!
//! This module provides generators for creating realistic test entities:
//! - [`IdentityGenerator`]: Generate identities, profiles and the eligible poster pool
//! - [`GroupGenerator`]: Create groups with a skewed membership graph, moderators and rules
//! - [`ContentGenerator`]: Create posts with power-law authorship, and comments
//! - [`InteractionGenerator`]: Sample reactions on posts and comments
//! - [`DerivedGenerator`]: Create shares and announcements on wrapper posts
//!
//! Generators are pure: they draw from the caller's RNG and [`ValueSource`]
//! and return rows. Persistence happens in [`crate::db`].
//!
//! [`ValueSource`]: crate::values::ValueSource

pub mod content;
pub mod derived;
pub mod group;
pub mod identity;
pub mod interaction;

pub use content::{AuthorTiers, ContentGenConfig, ContentGenerator, GeneratedComment, GeneratedPost};
pub use derived::{DerivedGenConfig, DerivedGenerator, GeneratedAnnouncement, GeneratedShare};
pub use group::{DegreeTiers, GeneratedGroup, GroupGenConfig, GroupGenerator, MembershipGraph};
pub use identity::{GeneratedIdentity, IdentityGenConfig, IdentityGenerator, IdentityPool};
pub use interaction::{InteractionGenConfig, InteractionGenerator};
