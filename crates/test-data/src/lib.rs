//! Synthetic social graph generation.
//!
//! This crate generates a realistic, referentially consistent social network
//! (identities, groups, memberships, posts, comments, reactions, shares and
//! announcements) and seeds it into Postgres or an in-memory store.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let (result, store) = ScenarioBuilder::small()
//!     .build(MemoryStore::new(), &mut rng)
//!     .await?;
//!
//! assert_eq!(store.commit_count(), 6);
//! ```

pub mod builders;
pub mod config;
pub mod db;
pub mod error;
pub mod generators;
pub mod sampling;
pub mod values;

// Re-export the data model
pub use social::models;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioMetrics, ScenarioResult};
    pub use crate::config::SeedConfig;
    pub use crate::db::{MemoryStore, PgStore, Seeder, Store};
    pub use crate::error::SeedError;
    pub use crate::generators::{
        ContentGenerator, DerivedGenerator, GroupGenerator, IdentityGenerator,
        InteractionGenerator,
    };
    pub use crate::values::ValueSource;
    pub use social::models::{PostKind, ReactionKind, Role};
}
