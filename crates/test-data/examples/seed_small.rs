//! Example: Seed a small social graph without a database.
//!
//! This runs every phase against the in-memory store, which checks keys and
//! references the same way the SQL schema does:
//! - 200 identities, 60 groups, 500 posts
//! - Comments on the first 100 posts
//! - Reactions, 50 shares and 5 announcements
//!
//! Run with:
//! ```
//! cargo run -p test-data --example seed_small
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use test_data::builders::ScenarioBuilder;
use test_data::db::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(54321);

    let (result, store) = ScenarioBuilder::small()
        .build(MemoryStore::new(), &mut rng)
        .await?;

    tracing::info!("Scenario seeded successfully!");
    tracing::info!("  Rows: {}", store.tables().row_count());
    tracing::info!("  Flushes: {}", store.flush_count());
    tracing::info!("  Commits: {}", store.commit_count());

    // Calculate some graph stats
    let avg_memberships =
        result.membership.memberships.len() as f64 / result.identities.len() as f64;
    let avg_comments = result.comments.len() as f64 / result.posts.len().max(1) as f64;

    tracing::info!("Graph stats:");
    tracing::info!("  Avg memberships per identity: {:.1}", avg_memberships);
    tracing::info!("  Avg comments per post: {:.2}", avg_comments);
    tracing::info!(
        "  Eligible posters: {:.1}%",
        result.eligible_ratio() * 100.0
    );

    Ok(())
}
