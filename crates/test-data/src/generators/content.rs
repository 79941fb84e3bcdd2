//! Post and comment generation.

use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::SliceRandom;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use social::models::{Comment, CommentBody, CommentStats, Post, PostBody, PostKind, PostStats};

use crate::error::SeedError;
use crate::sampling::{choose, new_id};
use crate::values::ValueSource;

/// Generated post with its body and stats rows.
#[derive(Debug, Clone)]
pub struct GeneratedPost {
    pub post: Post,
    pub body: PostBody,
    pub stats: PostStats,
}

/// Generated comment with its body and stats rows.
#[derive(Debug, Clone)]
pub struct GeneratedComment {
    pub comment: Comment,
    pub body: CommentBody,
    pub stats: CommentStats,
}

/// Sizes of the authoring tiers for a poster pool. Everyone else stays silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorTiers {
    pub power: usize,
    pub active: usize,
}

impl AuthorTiers {
    /// Each tier gets at least one author while the pool has room for it.
    pub fn split(population: usize, power_fraction: f64, active_fraction: f64) -> Self {
        let power = ((population as f64 * power_fraction) as usize)
            .max(1)
            .min(population);
        let active = ((population as f64 * active_fraction) as usize)
            .max(1)
            .min(population - power);
        Self { power, active }
    }
}

/// Configuration for content generation.
#[derive(Debug, Clone)]
pub struct ContentGenConfig {
    pub power_author_fraction: f64,
    pub active_author_fraction: f64,
    /// Share of all posts written by power authors; active authors write the rest.
    pub power_post_share: f64,
    pub likes: RangeInclusive<i32>,
    /// Only the first `comment_prefix` posts (creation order) receive comments.
    pub comment_prefix: usize,
    pub comments_per_post: RangeInclusive<usize>,
    /// Chance that a comment replies to an earlier comment on the same post.
    pub reply_probability: f64,
    /// Window after the parent in which a comment is written.
    pub comment_delay_minutes: i64,
}

impl Default for ContentGenConfig {
    fn default() -> Self {
        Self {
            power_author_fraction: 0.01,
            active_author_fraction: 0.19,
            power_post_share: 0.5,
            likes: 0..=100,
            comment_prefix: 5000,
            comments_per_post: 1..=5,
            reply_probability: 0.0,
            comment_delay_minutes: 48 * 60,
        }
    }
}

/// Generates posts and comments.
pub struct ContentGenerator {
    config: ContentGenConfig,
}

impl ContentGenerator {
    /// Creates a new content generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: ContentGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: ContentGenConfig) -> Self {
        Self { config }
    }

    /// Generates exactly `count` posts authored by `posters`.
    ///
    /// Power authors share `power_post_share` of the posts evenly, active authors
    /// share the rest; whatever integer division leaves over is written by random
    /// active authors (or any poster if there are none). Returns no posts, with a
    /// warning, when the poster pool is empty.
    pub fn generate_posts(
        &self,
        count: usize,
        posters: &[Uuid],
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedPost>, SeedError> {
        if posters.is_empty() {
            warn!("No eligible posters found, skipping post generation");
            return Ok(Vec::new());
        }

        info!("Generating {} posts...", count);

        let mut shuffled = posters.to_vec();
        shuffled.shuffle(rng);

        let tiers = AuthorTiers::split(
            shuffled.len(),
            self.config.power_author_fraction,
            self.config.active_author_fraction,
        );
        let power_authors = &shuffled[..tiers.power];
        let active_authors = &shuffled[tiers.power..tiers.power + tiers.active];

        let power_quota = (count as f64 * self.config.power_post_share) as usize;
        let active_quota = count - power_quota.min(count);
        let per_power_author = power_quota / power_authors.len().max(1);
        let per_active_author = if active_authors.is_empty() {
            0
        } else {
            active_quota / active_authors.len()
        };

        let mut posts = Vec::with_capacity(count);

        for &author in power_authors {
            for _ in 0..per_power_author {
                posts.push(self.generate_single_post(author, group_ids, values, rng)?);
            }
        }

        for &author in active_authors {
            for _ in 0..per_active_author {
                posts.push(self.generate_single_post(author, group_ids, values, rng)?);
            }
        }

        let backfill_pool = if active_authors.is_empty() {
            posters
        } else {
            active_authors
        };
        while posts.len() < count {
            let author = choose(rng, backfill_pool, "posters")?;
            posts.push(self.generate_single_post(author, group_ids, values, rng)?);
        }

        Ok(posts)
    }

    fn generate_single_post(
        &self,
        author_id: Uuid,
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<GeneratedPost, SeedError> {
        let id = new_id(rng);
        let group_id = choose(rng, group_ids, "groups")?;
        let kind = PostKind::AUTHORED[rng.gen_range(0..PostKind::AUTHORED.len())];

        Ok(GeneratedPost {
            post: Post {
                id,
                author_id,
                group_id,
                kind,
                created_at: values.date_time_this_year(rng),
                updated_at: None,
            },
            body: PostBody {
                post_id: id,
                content: values.paragraph(rng),
                tags: Some(values.word(rng)),
            },
            stats: PostStats {
                post_id: id,
                likes: rng.gen_range(self.config.likes.clone()),
                dislikes: 0,
            },
        })
    }

    /// Generates comments for the first `comment_prefix` posts.
    ///
    /// Authors come from `commenters`, which may include identities that never post.
    pub fn generate_comments(
        &self,
        posts: &[Post],
        commenters: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedComment>, SeedError> {
        let targets = &posts[..posts.len().min(self.config.comment_prefix)];
        info!("Generating comments for {} posts...", targets.len());

        let mut comments = Vec::new();

        for post in targets {
            let mut thread: Vec<(Uuid, OffsetDateTime)> = Vec::new();

            for _ in 0..rng.gen_range(self.config.comments_per_post.clone()) {
                let author_id = choose(rng, commenters, "commenters")?;

                let reply_to = if !thread.is_empty()
                    && rng.r#gen::<f64>() < self.config.reply_probability
                {
                    thread.choose(rng).copied()
                } else {
                    None
                };

                let (post_id, parent_id, after) = match reply_to {
                    Some((parent_id, parent_time)) => (None, Some(parent_id), parent_time),
                    None => (Some(post.id), None, post.created_at),
                };
                let created_at = self.comment_time(after, values, rng);

                let id = new_id(rng);
                thread.push((id, created_at));

                comments.push(GeneratedComment {
                    comment: Comment {
                        id,
                        author_id,
                        post_id,
                        parent_id,
                        created_at,
                    },
                    body: CommentBody {
                        comment_id: id,
                        content: values.sentence(rng),
                    },
                    stats: CommentStats {
                        comment_id: id,
                        likes: 0,
                        dislikes: 0,
                    },
                });
            }
        }

        Ok(comments)
    }

    fn comment_time(
        &self,
        after: OffsetDateTime,
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> OffsetDateTime {
        let delay = Duration::minutes(rng.gen_range(0..=self.config.comment_delay_minutes));
        (after + delay).min(values.now()).max(after)
    }
}

impl Default for ContentGenerator {
    fn default() -> Self {
        Self::new()
    }
}
