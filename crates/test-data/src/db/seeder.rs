//! Database seeding utilities.

use tracing::{debug, info};

use social::models::{CommentReaction, GroupRule, PostReaction};

use crate::db::store::{Batch, Store, Table};
use crate::error::SeedError;
use crate::generators::{
    GeneratedAnnouncement, GeneratedComment, GeneratedGroup, GeneratedPost, GeneratedShare,
    IdentityPool, MembershipGraph,
};

/// Rows written between flushes.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Writes generated data through a [`Store`].
///
/// Every `seed_*` method is one phase: it writes its rows in flushed chunks
/// and commits once at the end.
pub struct Seeder<S> {
    store: S,
    batch_size: usize,
}

impl<S: Store> Seeder<S> {
    /// Creates a new seeder over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the batch size for bulk operations.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Seeds identities and their profiles.
    pub async fn seed_identities(&mut self, pool: &IdentityPool) -> Result<(), SeedError> {
        info!("Seeding {} identities...", pool.len());

        self.write_rows(pool.identities.iter().cloned()).await?;
        self.write_rows(pool.profiles.iter().cloned()).await?;
        self.store.commit().await?;

        info!("Seeded {} identities", pool.len());
        Ok(())
    }

    /// Seeds groups with their details, stats, rules and membership graph.
    pub async fn seed_groups(
        &mut self,
        groups: &[GeneratedGroup],
        rules: &[GroupRule],
        graph: &MembershipGraph,
    ) -> Result<(), SeedError> {
        info!("Seeding {} groups...", groups.len());

        self.write_rows(groups.iter().map(|g| g.group.clone())).await?;
        self.write_rows(groups.iter().map(|g| g.detail.clone())).await?;
        self.write_rows(groups.iter().map(|g| g.stats.clone())).await?;
        self.write_rows(rules.iter().cloned()).await?;
        self.write_rows(graph.memberships.iter().cloned()).await?;
        self.write_rows(graph.moderators.iter().cloned()).await?;
        self.store.commit().await?;

        info!(
            "Seeded {} groups, {} memberships, {} moderators, {} rules",
            groups.len(),
            graph.memberships.len(),
            graph.moderators.len(),
            rules.len()
        );
        Ok(())
    }

    /// Seeds posts with their bodies and stats.
    pub async fn seed_posts(&mut self, posts: &[GeneratedPost]) -> Result<(), SeedError> {
        info!("Seeding {} posts...", posts.len());

        self.write_rows(posts.iter().map(|p| p.post.clone())).await?;
        self.write_rows(posts.iter().map(|p| p.body.clone())).await?;
        self.write_rows(posts.iter().map(|p| p.stats.clone())).await?;
        self.store.commit().await?;

        info!("Seeded {} posts", posts.len());
        Ok(())
    }

    /// Seeds comments with their bodies and stats.
    ///
    /// Comments are written in generation order, so a reply always lands
    /// after its parent.
    pub async fn seed_comments(&mut self, comments: &[GeneratedComment]) -> Result<(), SeedError> {
        info!("Seeding {} comments...", comments.len());

        self.write_rows(comments.iter().map(|c| c.comment.clone()))
            .await?;
        self.write_rows(comments.iter().map(|c| c.body.clone())).await?;
        self.write_rows(comments.iter().map(|c| c.stats.clone())).await?;
        self.store.commit().await?;

        info!("Seeded {} comments", comments.len());
        Ok(())
    }

    /// Seeds post and comment reactions.
    pub async fn seed_reactions(
        &mut self,
        post_reactions: &[PostReaction],
        comment_reactions: &[CommentReaction],
    ) -> Result<(), SeedError> {
        info!(
            "Seeding {} post reactions and {} comment reactions...",
            post_reactions.len(),
            comment_reactions.len()
        );

        self.write_rows(post_reactions.iter().cloned()).await?;
        self.write_rows(comment_reactions.iter().cloned()).await?;
        self.store.commit().await?;

        info!(
            "Seeded {} reactions",
            post_reactions.len() + comment_reactions.len()
        );
        Ok(())
    }

    /// Seeds shares and announcements.
    ///
    /// Each wrapper post is flushed before the extension row that references
    /// it is staged.
    pub async fn seed_derived(
        &mut self,
        shares: &[GeneratedShare],
        announcements: &[GeneratedAnnouncement],
    ) -> Result<(), SeedError> {
        info!(
            "Seeding {} shares and {} announcements...",
            shares.len(),
            announcements.len()
        );

        for (i, share) in shares.iter().enumerate() {
            self.store
                .insert(Batch::Posts(vec![share.wrapper.clone()]))
                .await?;
            self.store.flush().await?;
            self.store
                .insert(Batch::Shares(vec![share.share.clone()]))
                .await?;

            if (i + 1) % self.batch_size == 0 {
                info!("  Seeded {}/{} shares", i + 1, shares.len());
            }
        }

        for announcement in announcements {
            self.store
                .insert(Batch::Posts(vec![announcement.wrapper.clone()]))
                .await?;
            self.store.flush().await?;
            self.store
                .insert(Batch::Announcements(vec![announcement.announcement.clone()]))
                .await?;
        }

        self.store.commit().await?;

        info!(
            "Seeded {} shares and {} announcements",
            shares.len(),
            announcements.len()
        );
        Ok(())
    }

    /// Writes rows in chunks of `batch_size`, flushing after each chunk.
    async fn write_rows<T: Table>(
        &mut self,
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), SeedError> {
        let mut rows = rows.into_iter();
        let mut written = 0;

        loop {
            let chunk: Vec<T> = rows.by_ref().take(self.batch_size).collect();
            if chunk.is_empty() {
                break;
            }

            written += chunk.len();
            self.store.insert(T::into_batch(chunk)).await?;
            self.store.flush().await?;
            debug!("  Wrote {} {} rows", written, T::NAME);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::generators::IdentityGenerator;
    use crate::values::ValueSource;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn test_identities_written_in_chunks() {
        let identity_gen = IdentityGenerator::new().unwrap();
        let mut values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(51);
        let pool = identity_gen.generate_pool(25, &mut values, &mut rng).unwrap();

        let mut seeder = Seeder::new(MemoryStore::new()).with_batch_size(10);
        seeder.seed_identities(&pool).await.unwrap();

        let store = seeder.into_store();
        assert_eq!(store.tables().identities.len(), 25);
        assert_eq!(store.tables().profiles.len(), 25);
        // three identity chunks, three profile chunks, one commit flush
        assert_eq!(store.flush_count(), 7);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_phase_still_commits() {
        let mut seeder = Seeder::new(MemoryStore::new());
        seeder.seed_reactions(&[], &[]).await.unwrap();

        assert_eq!(seeder.store().commit_count(), 1);
        assert_eq!(seeder.store().tables().row_count(), 0);
    }

    /// Records the order of store calls without checking anything.
    #[derive(Default)]
    struct RecordingStore {
        calls: Vec<Call>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Wrapper(uuid::Uuid),
        Extension(uuid::Uuid),
        Flush,
        Commit,
    }

    #[async_trait::async_trait]
    impl Store for RecordingStore {
        async fn insert(&mut self, batch: Batch) -> Result<(), SeedError> {
            match batch {
                Batch::Posts(rows) => self.calls.extend(rows.iter().map(|p| Call::Wrapper(p.id))),
                Batch::Shares(rows) => {
                    self.calls.extend(rows.iter().map(|s| Call::Extension(s.post_id)))
                }
                Batch::Announcements(rows) => {
                    self.calls.extend(rows.iter().map(|a| Call::Extension(a.post_id)))
                }
                _ => {}
            }
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SeedError> {
            self.calls.push(Call::Flush);
            Ok(())
        }

        async fn commit(&mut self) -> Result<(), SeedError> {
            self.calls.push(Call::Commit);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_wrapper_flushed_before_extension() {
        let mut rng = StdRng::seed_from_u64(52);
        let data = crate::builders::ScenarioBuilder::small()
            .build_data(&mut rng)
            .unwrap();
        assert!(!data.shares.is_empty());
        assert!(!data.announcements.is_empty());

        let mut seeder = Seeder::new(RecordingStore::default());
        seeder
            .seed_derived(&data.shares, &data.announcements)
            .await
            .unwrap();
        let calls = seeder.into_store().calls;

        let extensions = calls
            .iter()
            .filter(|c| matches!(c, Call::Extension(_)))
            .count();
        assert_eq!(extensions, data.shares.len() + data.announcements.len());

        for (i, call) in calls.iter().enumerate() {
            if let Call::Extension(post_id) = call {
                let wrapper_at = calls[..i]
                    .iter()
                    .position(|c| *c == Call::Wrapper(*post_id))
                    .expect("extension staged before its wrapper");
                assert!(
                    calls[wrapper_at..i].contains(&Call::Flush),
                    "no flush between wrapper {post_id} and its extension"
                );
            }
        }
        assert_eq!(calls.last(), Some(&Call::Commit));
    }

    #[tokio::test]
    async fn test_derived_phase_passes_flush_check() {
        let mut rng = StdRng::seed_from_u64(53);
        let data = crate::builders::ScenarioBuilder::small()
            .build_data(&mut rng)
            .unwrap();

        let mut seeder = Seeder::new(MemoryStore::new());
        seeder.seed_identities(&data.identities).await.unwrap();
        seeder
            .seed_groups(&data.groups, &data.rules, &data.membership)
            .await
            .unwrap();
        seeder.seed_posts(&data.posts).await.unwrap();
        seeder
            .seed_derived(&data.shares, &data.announcements)
            .await
            .unwrap();

        let store = seeder.into_store();
        assert_eq!(store.tables().shares.len(), data.shares.len());
        assert_eq!(store.tables().announcements.len(), data.announcements.len());
    }

    #[test]
    fn test_batch_size_floor() {
        let seeder = Seeder::new(MemoryStore::new()).with_batch_size(0);
        assert_eq!(seeder.batch_size, 1);
    }
}
