//! Default seed script - populates a full-size social graph
//!
//! Run with:
//! ```
//! cargo run -p test-data --bin seed
//! ```
//!
//! Settings come from `SEED_CONFIG` (a JSON file), `DATABASE_URL`, `SEED_RNG`
//! and `SEED_DRY_RUN`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use test_data::builders::{ScenarioBuilder, ScenarioResult};
use test_data::config::SeedConfig;
use test_data::db::{MemoryStore, PgStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SeedConfig::load()?;
    tracing::info!(
        "Seeding {} identities, {} groups, {} posts (rng seed {})",
        config.identity_count,
        config.group_count,
        config.post_count,
        config.seed
    );

    let mut rng = StdRng::seed_from_u64(config.seed);

    let scenario = ScenarioBuilder::full_scale()
        .with_identities(config.identity_count)
        .with_groups(config.group_count)
        .with_posts(config.post_count)
        .with_batch_size(config.batch_size);

    let result = if config.dry_run {
        tracing::info!("Dry run: seeding into memory");
        let (result, store) = scenario.build(MemoryStore::new(), &mut rng).await?;
        tracing::info!("  Rows held in memory: {}", store.tables().row_count());
        result
    } else {
        let store = PgStore::connect(&config.database_url).await?;
        if config.reset {
            store.clear_all().await?;
        }
        scenario.build(store, &mut rng).await?.0
    };

    print_summary(&result);

    Ok(())
}

fn print_summary(result: &ScenarioResult) {
    tracing::info!("Seed completed!");
    tracing::info!("  Identities: {}", result.identities.len());
    tracing::info!(
        "  Eligible posters: {} ({:.1}%)",
        result.identities.eligible_posters.len(),
        result.eligible_ratio() * 100.0
    );
    tracing::info!("  Groups: {}", result.groups.len());
    tracing::info!("  Memberships: {}", result.membership.memberships.len());
    tracing::info!("  Moderators: {}", result.membership.moderators.len());
    tracing::info!("  Rules: {}", result.rules.len());
    tracing::info!("  Posts: {}", result.posts.len());
    tracing::info!("  Comments: {}", result.comments.len());
    tracing::info!("  Post reactions: {}", result.post_reactions.len());
    tracing::info!("  Comment reactions: {}", result.comment_reactions.len());
    tracing::info!("  Shares: {}", result.shares.len());
    tracing::info!("  Announcements: {}", result.announcements.len());

    if let Some(metrics) = &result.metrics {
        tracing::info!(
            "  Generation: {} ms, seeding: {} ms",
            metrics.generation_time_ms,
            metrics.seeding_time_ms
        );
    }
}
