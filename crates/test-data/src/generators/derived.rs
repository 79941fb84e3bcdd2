//! Share and announcement generation.
//!
//! Both are extensions of a wrapper [`Post`]: the wrapper row must be persisted
//! before the extension row that borrows its id.

use std::ops::RangeInclusive;

use rand::Rng;
use time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use social::models::{Announcement, AnnouncementCategory, Post, PostKind, Share};

use crate::error::SeedError;
use crate::sampling::{choose, new_id};
use crate::values::ValueSource;

/// A share and the wrapper post it extends.
#[derive(Debug, Clone)]
pub struct GeneratedShare {
    pub wrapper: Post,
    pub share: Share,
}

/// An announcement and the wrapper post it extends.
#[derive(Debug, Clone)]
pub struct GeneratedAnnouncement {
    pub wrapper: Post,
    pub announcement: Announcement,
}

/// Configuration for derived entity generation.
#[derive(Debug, Clone)]
pub struct DerivedGenConfig {
    pub share_count: usize,
    pub announcement_count: usize,
    pub validity_days: i64,
    pub subscribers: RangeInclusive<i32>,
}

impl Default for DerivedGenConfig {
    fn default() -> Self {
        Self {
            share_count: 1000,
            announcement_count: 50,
            validity_days: 7,
            subscribers: 0..=500,
        }
    }
}

/// Generates shares and announcements on top of existing posts.
pub struct DerivedGenerator {
    config: DerivedGenConfig,
}

impl DerivedGenerator {
    /// Creates a new derived entity generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: DerivedGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: DerivedGenConfig) -> Self {
        Self { config }
    }

    /// Generates shares of existing posts.
    ///
    /// Sharer, origin post and destination group are drawn independently with
    /// replacement, so any number of shares can be made from a small post pool.
    pub fn generate_shares(
        &self,
        sharers: &[Uuid],
        origin_posts: &[Uuid],
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedShare>, SeedError> {
        if sharers.is_empty() || origin_posts.is_empty() || group_ids.is_empty() {
            warn!("Nothing to share, skipping share generation");
            return Ok(Vec::new());
        }

        info!("Generating {} shares...", self.config.share_count);

        (0..self.config.share_count)
            .map(|_| -> Result<GeneratedShare, SeedError> {
                let sharer_id = choose(rng, sharers, "sharers")?;
                let origin_post_id = choose(rng, origin_posts, "posts")?;
                let group_id = choose(rng, group_ids, "groups")?;

                let wrapper = Post {
                    id: new_id(rng),
                    author_id: sharer_id,
                    group_id,
                    kind: PostKind::Share,
                    created_at: values.date_time_this_year(rng),
                    updated_at: None,
                };
                let share = Share {
                    post_id: wrapper.id,
                    origin_post_id,
                    sharer_id,
                    group_id,
                    created_at: wrapper.created_at,
                };

                Ok(GeneratedShare { wrapper, share })
            })
            .collect()
    }

    /// Generates announcements valid from now for `validity_days`.
    pub fn generate_announcements(
        &self,
        authors: &[Uuid],
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedAnnouncement>, SeedError> {
        if authors.is_empty() || group_ids.is_empty() {
            warn!("No authors or groups, skipping announcement generation");
            return Ok(Vec::new());
        }

        info!("Generating {} announcements...", self.config.announcement_count);

        (0..self.config.announcement_count)
            .map(|_| -> Result<GeneratedAnnouncement, SeedError> {
                let wrapper = Post {
                    id: new_id(rng),
                    author_id: choose(rng, authors, "authors")?,
                    group_id: choose(rng, group_ids, "groups")?,
                    kind: PostKind::Text,
                    created_at: values.date_time_this_year(rng),
                    updated_at: None,
                };

                let starts_at = values.now();
                let announcement = Announcement {
                    post_id: wrapper.id,
                    starts_at,
                    ends_at: starts_at + Duration::days(self.config.validity_days),
                    category: AnnouncementCategory::ALL
                        [rng.gen_range(0..AnnouncementCategory::ALL.len())],
                    is_active: true,
                    subscriber_count: rng.gen_range(self.config.subscribers.clone()),
                };

                Ok(GeneratedAnnouncement {
                    wrapper,
                    announcement,
                })
            })
            .collect()
    }
}

impl Default for DerivedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn ids(n: usize, rng: &mut impl Rng) -> Vec<Uuid> {
        (0..n).map(|_| new_id(rng)).collect()
    }

    #[test]
    fn test_many_shares_from_few_posts() {
        let derived_gen = DerivedGenerator::new();
        let values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(41);
        let users = ids(20, &mut rng);
        let posts = ids(10, &mut rng);
        let groups = ids(5, &mut rng);

        let shares = derived_gen
            .generate_shares(&users, &posts, &groups, &values, &mut rng)
            .unwrap();

        assert_eq!(shares.len(), 1000);
        let wrappers: HashSet<Uuid> = shares.iter().map(|s| s.wrapper.id).collect();
        assert_eq!(wrappers.len(), 1000);

        for s in &shares {
            assert_eq!(s.wrapper.kind, PostKind::Share);
            assert_eq!(s.share.post_id, s.wrapper.id);
            assert_ne!(s.share.post_id, s.share.origin_post_id);
            assert!(posts.contains(&s.share.origin_post_id));
            assert_eq!(s.share.sharer_id, s.wrapper.author_id);
            assert_eq!(s.share.group_id, s.wrapper.group_id);
            assert_eq!(s.share.created_at, s.wrapper.created_at);
        }
    }

    #[test]
    fn test_no_posts_no_shares() {
        let derived_gen = DerivedGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();
        let users = ids(3, &mut rng);
        let groups = ids(3, &mut rng);

        let shares = derived_gen
            .generate_shares(&users, &[], &groups, &values, &mut rng)
            .unwrap();
        assert!(shares.is_empty());
    }

    #[test]
    fn test_announcements() {
        let derived_gen = DerivedGenerator::new();
        let values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(42);
        let users = ids(5, &mut rng);
        let groups = ids(2, &mut rng);

        let announcements = derived_gen
            .generate_announcements(&users, &groups, &values, &mut rng)
            .unwrap();

        assert_eq!(announcements.len(), 50);
        for a in &announcements {
            assert_eq!(a.wrapper.kind, PostKind::Text);
            assert_eq!(a.announcement.post_id, a.wrapper.id);
            assert!(a.announcement.ends_at > a.announcement.starts_at);
            assert_eq!(
                a.announcement.ends_at - a.announcement.starts_at,
                Duration::days(7)
            );
            assert!(a.announcement.is_active);
            assert!((0..=500).contains(&a.announcement.subscriber_count));
        }
    }

    #[test]
    fn test_no_authors_no_announcements() {
        let derived_gen = DerivedGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();
        let groups = ids(2, &mut rng);

        let announcements = derived_gen
            .generate_announcements(&[], &groups, &values, &mut rng)
            .unwrap();
        assert!(announcements.is_empty());
    }
}
