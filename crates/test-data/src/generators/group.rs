//! Group generation: groups, the skewed membership graph, moderators and rules.

use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

use social::models::{
    Group, GroupDetail, GroupRule, GroupStats, MemberRole, Membership, ModeratorRecord, RuleAction,
};

use crate::error::SeedError;
use crate::sampling::{choose, new_id, sample_distinct};
use crate::values::ValueSource;

/// Generated group with its detail and stats rows.
#[derive(Debug, Clone)]
pub struct GeneratedGroup {
    pub group: Group,
    pub detail: GroupDetail,
    pub stats: GroupStats,
}

/// Memberships plus the moderator records mirroring moderator memberships.
#[derive(Debug, Clone, Default)]
pub struct MembershipGraph {
    pub memberships: Vec<Membership>,
    pub moderators: Vec<ModeratorRecord>,
}

/// Sizes of the three degree tiers for a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeTiers {
    /// Identities that join nothing.
    pub isolates: usize,
    /// Identities that join a handful of groups.
    pub normal: usize,
    /// High-degree identities, the remainder after the two fractions above.
    pub connectors: usize,
}

impl DegreeTiers {
    /// Splits `population` by flooring each fraction; connectors take the rest.
    pub fn split(population: usize, isolate_fraction: f64, normal_fraction: f64) -> Self {
        let isolates = ((population as f64 * isolate_fraction) as usize).min(population);
        let normal = ((population as f64 * normal_fraction) as usize).min(population - isolates);
        Self {
            isolates,
            normal,
            connectors: population - isolates - normal,
        }
    }
}

/// Configuration for group generation.
#[derive(Debug, Clone)]
pub struct GroupGenConfig {
    pub categories: Vec<String>,
    pub private_probability: f64,
    /// Fraction of the shuffled pool joining no group.
    pub isolate_fraction: f64,
    /// Fraction of the shuffled pool joining a few groups.
    pub normal_fraction: f64,
    pub normal_memberships: RangeInclusive<usize>,
    pub connector_memberships: RangeInclusive<usize>,
    /// Chance that each connector membership is a moderator seat.
    pub moderator_probability: f64,
    pub rules_per_group: RangeInclusive<usize>,
    /// Seeded member count; only the creator is counted.
    pub initial_member_count: i32,
}

impl Default for GroupGenConfig {
    fn default() -> Self {
        Self {
            categories: ["Tech", "Art", "News", "Gaming", "Music", "Science"]
                .into_iter()
                .map(String::from)
                .collect(),
            private_probability: 0.5,
            isolate_fraction: 0.2,
            normal_fraction: 0.7,
            normal_memberships: 1..=5,
            connector_memberships: 10..=50,
            moderator_probability: 0.2,
            rules_per_group: 1..=5,
            initial_member_count: 1,
        }
    }
}

/// Generates groups, memberships and rules.
pub struct GroupGenerator {
    config: GroupGenConfig,
}

impl GroupGenerator {
    /// Creates a new group generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: GroupGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: GroupGenConfig) -> Self {
        Self { config }
    }

    /// Generates `count` groups, each created by a random identity from `creators`.
    pub fn generate_groups(
        &self,
        count: usize,
        creators: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedGroup>, SeedError> {
        info!("Generating {} groups...", count);

        (0..count)
            .map(|_| self.generate_single_group(creators, values, rng))
            .collect()
    }

    fn generate_single_group(
        &self,
        creators: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<GeneratedGroup, SeedError> {
        let id = new_id(rng);
        let creator_id = choose(rng, creators, "group creators")?;
        let category = self.config.categories.choose(rng).cloned();

        let group = Group {
            id,
            name: values.company_name(rng),
            category,
            is_private: rng.r#gen::<f64>() < self.config.private_probability,
            icon_url: Some(values.image_url(rng)),
        };

        let detail = GroupDetail {
            group_id: id,
            description: Some(values.paragraph(rng)),
            creator_id,
            created_at: values.date_time_this_year(rng),
            tags: Some(values.word(rng)),
        };

        Ok(GeneratedGroup {
            group,
            detail,
            stats: GroupStats {
                group_id: id,
                member_count: self.config.initial_member_count,
            },
        })
    }

    /// Builds the membership graph over `identities`.
    ///
    /// A shuffled copy of the pool is split into isolates, normal members and
    /// connectors. Each identity draws its groups without replacement, so no
    /// (group, identity) pair repeats; different identities draw independently.
    /// Degrees are capped at the number of groups.
    pub fn generate_memberships(
        &self,
        identities: &[Uuid],
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Result<MembershipGraph, SeedError> {
        let mut shuffled = identities.to_vec();
        shuffled.shuffle(rng);

        let tiers = DegreeTiers::split(
            shuffled.len(),
            self.config.isolate_fraction,
            self.config.normal_fraction,
        );
        info!(
            "Generating memberships: {} isolates, {} members, {} connectors",
            tiers.isolates, tiers.normal, tiers.connectors
        );

        let normal = &shuffled[tiers.isolates..tiers.isolates + tiers.normal];
        let connectors = &shuffled[tiers.isolates + tiers.normal..];

        let mut graph = MembershipGraph::default();

        for &identity_id in normal {
            let degree = rng
                .gen_range(self.config.normal_memberships.clone())
                .min(group_ids.len());
            for group_id in sample_distinct(rng, group_ids, degree, "groups")? {
                graph.memberships.push(Membership {
                    group_id,
                    identity_id,
                    joined_at: values.date_time_this_year(rng),
                    role: MemberRole::Member,
                });
            }
        }

        for &identity_id in connectors {
            let degree = rng
                .gen_range(self.config.connector_memberships.clone())
                .min(group_ids.len());
            for group_id in sample_distinct(rng, group_ids, degree, "groups")? {
                let joined_at = values.date_time_this_year(rng);
                let role = if rng.r#gen::<f64>() < self.config.moderator_probability {
                    graph.moderators.push(ModeratorRecord {
                        group_id,
                        identity_id,
                        assigned_at: values.now(),
                    });
                    MemberRole::Moderator
                } else {
                    MemberRole::Member
                };

                graph.memberships.push(Membership {
                    group_id,
                    identity_id,
                    joined_at,
                    role,
                });
            }
        }

        Ok(graph)
    }

    /// Attaches a few moderation rules to every group.
    pub fn generate_rules(
        &self,
        group_ids: &[Uuid],
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Vec<GroupRule> {
        let mut rules = Vec::new();

        for &group_id in group_ids {
            for _ in 0..rng.gen_range(self.config.rules_per_group.clone()) {
                let name = values.word(rng);
                let pattern = format!(r"(?i)\b{}\b", values.word(rng));
                let action = RuleAction::ALL[rng.gen_range(0..RuleAction::ALL.len())];

                rules.push(GroupRule {
                    id: new_id(rng),
                    group_id,
                    name,
                    pattern,
                    action,
                    description: None,
                });
            }
        }

        rules
    }
}

impl Default for GroupGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn ids(n: usize, rng: &mut impl Rng) -> Vec<Uuid> {
        (0..n).map(|_| new_id(rng)).collect()
    }

    #[test]
    fn test_generate_groups() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();
        let users = ids(20, &mut rng);

        let groups = group_gen.generate_groups(5, &users, &values, &mut rng).unwrap();

        assert_eq!(groups.len(), 5);
        for g in &groups {
            assert!(!g.group.name.is_empty());
            assert!(users.contains(&g.detail.creator_id));
            assert_eq!(g.detail.group_id, g.group.id);
            // Creator is counted but never materialized as a membership
            assert_eq!(g.stats.member_count, 1);
        }
    }

    #[test]
    fn test_groups_need_creators() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();

        let result = group_gen.generate_groups(3, &[], &values, &mut rng);
        assert!(matches!(result, Err(SeedError::EmptyPool(_))));

        let none = group_gen.generate_groups(0, &[], &values, &mut rng).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_tier_split() {
        assert_eq!(
            DegreeTiers::split(5, 0.2, 0.7),
            DegreeTiers {
                isolates: 1,
                normal: 3,
                connectors: 1
            }
        );
        assert_eq!(
            DegreeTiers::split(10_000, 0.2, 0.7),
            DegreeTiers {
                isolates: 2000,
                normal: 7000,
                connectors: 1000
            }
        );
        assert_eq!(
            DegreeTiers::split(0, 0.2, 0.7),
            DegreeTiers {
                isolates: 0,
                normal: 0,
                connectors: 0
            }
        );
    }

    #[test]
    fn test_memberships_unique_and_mirrored() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(11);
        let users = ids(300, &mut rng);
        let groups = ids(60, &mut rng);

        let graph = group_gen
            .generate_memberships(&users, &groups, &values, &mut rng)
            .unwrap();

        let pairs: HashSet<(Uuid, Uuid)> = graph
            .memberships
            .iter()
            .map(|m| (m.group_id, m.identity_id))
            .collect();
        assert_eq!(pairs.len(), graph.memberships.len());

        let moderator_memberships: HashSet<(Uuid, Uuid)> = graph
            .memberships
            .iter()
            .filter(|m| m.role == MemberRole::Moderator)
            .map(|m| (m.group_id, m.identity_id))
            .collect();
        let records: HashSet<(Uuid, Uuid)> = graph
            .moderators
            .iter()
            .map(|m| (m.group_id, m.identity_id))
            .collect();
        assert_eq!(moderator_memberships, records);
        assert_eq!(records.len(), graph.moderators.len());
        assert!(!records.is_empty());
    }

    #[test]
    fn test_degree_distribution() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(12);
        let users = ids(100, &mut rng);
        let groups = ids(80, &mut rng);

        let graph = group_gen
            .generate_memberships(&users, &groups, &values, &mut rng)
            .unwrap();

        let mut degree: HashMap<Uuid, usize> = HashMap::new();
        for m in &graph.memberships {
            *degree.entry(m.identity_id).or_insert(0) += 1;
        }

        // 20 isolates never appear
        assert_eq!(degree.len(), 80);
        let normal = degree.values().filter(|&&d| (1..=5).contains(&d)).count();
        let connectors = degree.values().filter(|&&d| (10..=50).contains(&d)).count();
        assert_eq!(normal, 70);
        assert_eq!(connectors, 10);

        // Only connectors moderate
        for m in &graph.moderators {
            assert!(degree[&m.identity_id] >= 10);
        }
    }

    #[test]
    fn test_small_pool_caps_degree() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(13);
        let users = ids(5, &mut rng);
        let groups = ids(4, &mut rng);

        let graph = group_gen
            .generate_memberships(&users, &groups, &values, &mut rng)
            .unwrap();

        let mut degree: HashMap<Uuid, usize> = HashMap::new();
        for m in &graph.memberships {
            *degree.entry(m.identity_id).or_insert(0) += 1;
        }

        assert_eq!(degree.len(), 4);
        // The single connector joins every group there is
        assert!(degree.values().any(|&d| d == 4));
        assert!(degree.values().all(|&d| d <= groups.len()));
    }

    #[test]
    fn test_no_groups_no_memberships() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();
        let users = ids(10, &mut rng);

        let graph = group_gen
            .generate_memberships(&users, &[], &values, &mut rng)
            .unwrap();
        assert!(graph.memberships.is_empty());
        assert!(graph.moderators.is_empty());
    }

    #[test]
    fn test_generate_rules() {
        let group_gen = GroupGenerator::new();
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();
        let groups = ids(25, &mut rng);

        let rules = group_gen.generate_rules(&groups, &values, &mut rng);

        for group_id in &groups {
            let count = rules.iter().filter(|r| r.group_id == *group_id).count();
            assert!((1..=5).contains(&count), "group has {count} rules");
        }
        assert!(rules.iter().all(|r| r.pattern.starts_with("(?i)")));
    }
}
