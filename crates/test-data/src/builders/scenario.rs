//! Fluent builder for constructing seeding scenarios.

use std::time::Instant;

use rand::Rng;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use social::models::{CommentReaction, GroupRule, Post, PostReaction};

use crate::db::{DEFAULT_BATCH_SIZE, Seeder, Store};
use crate::error::SeedError;
use crate::generators::{
    ContentGenConfig, ContentGenerator, DerivedGenConfig, DerivedGenerator, GeneratedAnnouncement,
    GeneratedComment, GeneratedGroup, GeneratedPost, GeneratedShare, GroupGenConfig,
    GroupGenerator, IdentityGenConfig, IdentityGenerator, IdentityPool, InteractionGenConfig,
    InteractionGenerator, MembershipGraph,
};
use crate::values::ValueSource;

/// Result of building and seeding a scenario.
#[derive(Debug)]
pub struct ScenarioResult {
    pub identities: IdentityPool,
    pub groups: Vec<GeneratedGroup>,
    pub membership: MembershipGraph,
    pub rules: Vec<GroupRule>,
    pub posts: Vec<GeneratedPost>,
    pub comments: Vec<GeneratedComment>,
    pub post_reactions: Vec<PostReaction>,
    pub comment_reactions: Vec<CommentReaction>,
    pub shares: Vec<GeneratedShare>,
    pub announcements: Vec<GeneratedAnnouncement>,
    /// Metrics from scenario generation (populated if metrics tracking enabled).
    pub metrics: Option<ScenarioMetrics>,
}

impl ScenarioResult {
    /// Fraction of identities eligible to post, 0.0 for an empty population.
    pub fn eligible_ratio(&self) -> f64 {
        if self.identities.is_empty() {
            0.0
        } else {
            self.identities.eligible_posters.len() as f64 / self.identities.len() as f64
        }
    }

    /// Ids of ordinary posts, in creation order.
    pub fn post_ids(&self) -> Vec<Uuid> {
        self.posts.iter().map(|p| p.post.id).collect()
    }
}

/// Performance metrics from scenario generation.
#[derive(Debug, Clone)]
pub struct ScenarioMetrics {
    /// Time spent generating data (milliseconds).
    pub generation_time_ms: u64,
    /// Time spent seeding the store (milliseconds, 0 if build_data used).
    pub seeding_time_ms: u64,
    pub identity_count: usize,
    pub eligible_count: usize,
    pub group_count: usize,
    pub membership_count: usize,
    pub moderator_count: usize,
    pub rule_count: usize,
    pub post_count: usize,
    pub comment_count: usize,
    pub reaction_count: usize,
    pub share_count: usize,
    pub announcement_count: usize,
}

/// Builder for creating complete social graph scenarios.
///
/// # Example
///
/// ```rust,ignore
/// let result = ScenarioBuilder::small()
///     .with_identities(200)
///     .with_metrics(true)
///     .build(store, &mut rng)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    identity_count: usize,
    identity_config: IdentityGenConfig,

    group_count: usize,
    group_config: GroupGenConfig,

    post_count: usize,
    content_config: ContentGenConfig,

    interaction_config: InteractionGenConfig,
    derived_config: DerivedGenConfig,

    // Misc
    clock: Option<OffsetDateTime>,
    batch_size: usize,
    track_metrics: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// Creates a new scenario builder at full scale with default generator settings.
    pub fn new() -> Self {
        Self {
            identity_count: 10_000,
            identity_config: IdentityGenConfig::default(),
            group_count: 500,
            group_config: GroupGenConfig::default(),
            post_count: 100_000,
            content_config: ContentGenConfig::default(),
            interaction_config: InteractionGenConfig::default(),
            derived_config: DerivedGenConfig::default(),
            clock: None,
            batch_size: DEFAULT_BATCH_SIZE,
            track_metrics: false,
        }
    }

    /// Sets the number of identities to generate.
    pub fn with_identities(mut self, count: usize) -> Self {
        self.identity_count = count;
        self
    }

    pub fn with_identity_config(mut self, config: IdentityGenConfig) -> Self {
        self.identity_config = config;
        self
    }

    /// Sets the number of groups to generate.
    pub fn with_groups(mut self, count: usize) -> Self {
        self.group_count = count;
        self
    }

    pub fn with_group_config(mut self, config: GroupGenConfig) -> Self {
        self.group_config = config;
        self
    }

    /// Sets the exact number of ordinary posts to generate.
    pub fn with_posts(mut self, count: usize) -> Self {
        self.post_count = count;
        self
    }

    pub fn with_content_config(mut self, config: ContentGenConfig) -> Self {
        self.content_config = config;
        self
    }

    pub fn with_interaction_config(mut self, config: InteractionGenConfig) -> Self {
        self.interaction_config = config;
        self
    }

    pub fn with_derived_config(mut self, config: DerivedGenConfig) -> Self {
        self.derived_config = config;
        self
    }

    /// Pins "now" for every timestamp drawn, so a fixed RNG seed reproduces
    /// the exact dataset.
    pub fn with_clock(mut self, clock: OffsetDateTime) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the number of rows written between flushes.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Enables metrics tracking for performance analysis.
    ///
    /// When enabled, the result will include timing and count metrics
    /// useful for sizing benchmark datasets.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.track_metrics = enabled;
        self
    }

    /// Generates all data without touching a store.
    ///
    /// Phases run in dependency order: identities, groups and their
    /// relations, posts and comments, then reactions and derived entities.
    pub fn build_data(&self, rng: &mut impl Rng) -> Result<ScenarioResult, SeedError> {
        let start_time = self.track_metrics.then(Instant::now);
        let mut values = match self.clock {
            Some(clock) => ValueSource::with_clock(clock),
            None => ValueSource::new(),
        };

        let identities = IdentityGenerator::with_config(self.identity_config.clone())?
            .generate_pool(self.identity_count, &mut values, rng)?;

        let group_gen = GroupGenerator::with_config(self.group_config.clone());
        let groups = group_gen.generate_groups(
            self.group_count,
            &identities.eligible_posters,
            &values,
            rng,
        )?;
        let group_ids: Vec<Uuid> = groups.iter().map(|g| g.group.id).collect();
        let membership = group_gen.generate_memberships(
            &identities.eligible_posters,
            &group_ids,
            &values,
            rng,
        )?;
        let rules = group_gen.generate_rules(&group_ids, &values, rng);

        let content_gen = ContentGenerator::with_config(self.content_config.clone());
        let posts = content_gen.generate_posts(
            self.post_count,
            &identities.eligible_posters,
            &group_ids,
            &values,
            rng,
        )?;
        let post_rows: Vec<Post> = posts.iter().map(|p| p.post.clone()).collect();
        let comments = content_gen.generate_comments(&post_rows, &identities.ids, &values, rng)?;

        let post_ids: Vec<Uuid> = post_rows.iter().map(|p| p.id).collect();
        let comment_ids: Vec<Uuid> = comments.iter().map(|c| c.comment.id).collect();

        let interaction_gen = InteractionGenerator::with_config(self.interaction_config.clone());
        let post_reactions =
            interaction_gen.generate_post_reactions(&post_ids, &identities.ids, &values, rng)?;
        let comment_reactions = interaction_gen.generate_comment_reactions(
            &comment_ids,
            &identities.ids,
            &values,
            rng,
        )?;

        let derived_gen = DerivedGenerator::with_config(self.derived_config.clone());
        let shares = derived_gen.generate_shares(
            &identities.eligible_posters,
            &post_ids,
            &group_ids,
            &values,
            rng,
        )?;
        let announcements = derived_gen.generate_announcements(
            &identities.eligible_posters,
            &group_ids,
            &values,
            rng,
        )?;

        let metrics = start_time.map(|start| ScenarioMetrics {
            generation_time_ms: start.elapsed().as_millis() as u64,
            seeding_time_ms: 0,
            identity_count: identities.len(),
            eligible_count: identities.eligible_posters.len(),
            group_count: groups.len(),
            membership_count: membership.memberships.len(),
            moderator_count: membership.moderators.len(),
            rule_count: rules.len(),
            post_count: posts.len(),
            comment_count: comments.len(),
            reaction_count: post_reactions.len() + comment_reactions.len(),
            share_count: shares.len(),
            announcement_count: announcements.len(),
        });

        Ok(ScenarioResult {
            identities,
            groups,
            membership,
            rules,
            posts,
            comments,
            post_reactions,
            comment_reactions,
            shares,
            announcements,
            metrics,
        })
    }

    /// Generates all data and seeds it into `store`, one commit per phase.
    ///
    /// Returns the generated data and the store so callers can inspect it.
    pub async fn build<S: Store>(
        self,
        store: S,
        rng: &mut impl Rng,
    ) -> Result<(ScenarioResult, S), SeedError> {
        let mut result = self.build_data(rng)?;
        info!(
            "Generated {} identities ({:.1}% eligible to post)",
            result.identities.len(),
            result.eligible_ratio() * 100.0
        );

        let seed_start = self.track_metrics.then(Instant::now);

        let mut seeder = Seeder::new(store).with_batch_size(self.batch_size);

        // Seed in dependency order
        seeder.seed_identities(&result.identities).await?;
        seeder
            .seed_groups(&result.groups, &result.rules, &result.membership)
            .await?;
        seeder.seed_posts(&result.posts).await?;
        seeder.seed_comments(&result.comments).await?;
        seeder
            .seed_reactions(&result.post_reactions, &result.comment_reactions)
            .await?;
        seeder
            .seed_derived(&result.shares, &result.announcements)
            .await?;

        // Update seeding time in metrics
        if let (Some(start), Some(metrics)) = (seed_start, result.metrics.as_mut()) {
            metrics.seeding_time_ms = start.elapsed().as_millis() as u64;
        }

        Ok((result, seeder.into_store()))
    }

    // ========================================================================
    // Preset Scenarios
    // ========================================================================

    /// Full-size dataset: 10k identities, 500 groups, 100k posts.
    pub fn full_scale() -> Self {
        Self::new().with_metrics(true)
    }

    /// Small dataset for local runs and tests.
    ///
    /// Counts are scaled down together so every phase still produces rows:
    /// connectors can fill their degree range and the reactor pool covers the
    /// largest per-target draw.
    pub fn small() -> Self {
        Self::new()
            .with_identities(200)
            .with_groups(60)
            .with_posts(500)
            .with_content_config(ContentGenConfig {
                comment_prefix: 100,
                ..Default::default()
            })
            .with_derived_config(DerivedGenConfig {
                share_count: 50,
                announcement_count: 5,
                ..Default::default()
            })
            .with_batch_size(100)
            .with_metrics(true)
    }
}
