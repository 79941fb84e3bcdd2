//! Reaction sampling over posts and comments.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use social::models::{CommentReaction, PostReaction, ReactionKind};

use crate::error::SeedError;
use crate::sampling::sample_distinct;
use crate::values::ValueSource;

/// Configuration for reaction sampling.
#[derive(Debug, Clone)]
pub struct InteractionGenConfig {
    /// Fraction of posts (floored) that receive reactions.
    pub post_fraction: f64,
    pub reactors_per_post: RangeInclusive<usize>,
    /// Fraction of comments (floored) that receive reactions.
    pub comment_fraction: f64,
    pub reactors_per_comment: RangeInclusive<usize>,
}

impl Default for InteractionGenConfig {
    fn default() -> Self {
        Self {
            post_fraction: 0.10,
            reactors_per_post: 1..=10,
            comment_fraction: 0.05,
            reactors_per_comment: 1..=5,
        }
    }
}

/// Samples which targets get reactions and who reacts.
pub struct InteractionGenerator {
    config: InteractionGenConfig,
}

impl InteractionGenerator {
    /// Creates a new interaction generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: InteractionGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: InteractionGenConfig) -> Self {
        Self { config }
    }

    /// Generates post reactions from any identity in `reactors`.
    ///
    /// Each sampled post draws its reactors without replacement, so an identity
    /// reacts at most once per post.
    pub fn generate_post_reactions(
        &self,
        post_ids: &[Uuid],
        reactors: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<PostReaction>, SeedError> {
        let targets = sample_fraction(rng, post_ids, self.config.post_fraction, "posts")?;
        info!("Generating reactions for {} posts...", targets.len());

        let mut reactions = Vec::new();
        for post_id in targets {
            let n = rng.gen_range(self.config.reactors_per_post.clone());
            for identity_id in sample_distinct(rng, reactors, n, "reactors")? {
                reactions.push(PostReaction {
                    post_id,
                    identity_id,
                    kind: random_kind(rng),
                    created_at: values.date_time_this_year(rng),
                });
            }
        }

        Ok(reactions)
    }

    /// Generates comment reactions from any identity in `reactors`.
    pub fn generate_comment_reactions(
        &self,
        comment_ids: &[Uuid],
        reactors: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<CommentReaction>, SeedError> {
        let targets = sample_fraction(rng, comment_ids, self.config.comment_fraction, "comments")?;
        info!("Generating reactions for {} comments...", targets.len());

        let mut reactions = Vec::new();
        for comment_id in targets {
            let n = rng.gen_range(self.config.reactors_per_comment.clone());
            for identity_id in sample_distinct(rng, reactors, n, "reactors")? {
                reactions.push(CommentReaction {
                    comment_id,
                    identity_id,
                    kind: random_kind(rng),
                    created_at: values.date_time_this_year(rng),
                });
            }
        }

        Ok(reactions)
    }
}

impl Default for InteractionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_fraction(
    rng: &mut impl Rng,
    pool: &[Uuid],
    fraction: f64,
    what: &'static str,
) -> Result<Vec<Uuid>, SeedError> {
    let amount = (pool.len() as f64 * fraction) as usize;
    sample_distinct(rng, pool, amount, what)
}

fn random_kind(rng: &mut impl Rng) -> ReactionKind {
    ReactionKind::ALL[rng.gen_range(0..ReactionKind::ALL.len())]
}
