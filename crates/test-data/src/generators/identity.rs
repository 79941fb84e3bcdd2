//! Identity and profile generation.

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use social::models::{Identity, Profile, Role};

use crate::error::SeedError;
use crate::sampling::{Weighted, new_id};
use crate::values::ValueSource;

/// Generated identity with its profile, ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedIdentity {
    pub identity: Identity,
    pub profile: Profile,
}

/// The base population and the subset allowed to post.
#[derive(Debug, Clone, Default)]
pub struct IdentityPool {
    pub identities: Vec<Identity>,
    pub profiles: Vec<Profile>,
    /// Ids of every identity, in creation order.
    pub ids: Vec<Uuid>,
    /// Ids of identities that are verified or have a contact handle.
    pub eligible_posters: Vec<Uuid>,
}

impl IdentityPool {
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Configuration for identity generation.
#[derive(Debug, Clone)]
pub struct IdentityGenConfig {
    /// Weighted role draw.
    pub role_weights: Vec<(Role, f64)>,
    /// Probability of taking the email branch.
    pub email_probability: f64,
    /// Probability that an identity on the email branch also gets a phone.
    pub extra_phone_probability: f64,
    pub bio_fill_rate: f64,
    pub location_fill_rate: f64,
    pub avatar_fill_rate: f64,
}

impl Default for IdentityGenConfig {
    fn default() -> Self {
        Self {
            role_weights: vec![
                (Role::Member, 0.8),
                (Role::Verified, 0.15),
                (Role::Admin, 0.05),
            ],
            email_probability: 0.5,
            extra_phone_probability: 0.5,
            bio_fill_rate: 0.8,
            location_fill_rate: 0.7,
            avatar_fill_rate: 0.9,
        }
    }
}

/// Generates identities with role, handles and profile.
pub struct IdentityGenerator {
    config: IdentityGenConfig,
    roles: Weighted<Role>,
}

impl IdentityGenerator {
    /// Creates a new identity generator with default configuration.
    pub fn new() -> Result<Self, SeedError> {
        Self::with_config(IdentityGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: IdentityGenConfig) -> Result<Self, SeedError> {
        let roles = Weighted::new(&config.role_weights)?;
        Ok(Self { config, roles })
    }

    /// Generates a single identity.
    pub fn generate(
        &self,
        values: &mut ValueSource,
        rng: &mut impl Rng,
    ) -> Result<GeneratedIdentity, SeedError> {
        let id = new_id(rng);
        let role = self.roles.sample(rng);

        // Email branch: email always, phone sometimes. Phone branch: phone only.
        let (email, phone) = if rng.r#gen::<f64>() < self.config.email_probability {
            let email = values.unique_email(rng)?;
            let phone = if rng.r#gen::<f64>() < self.config.extra_phone_probability {
                Some(values.unique_phone(rng)?)
            } else {
                None
            };
            (Some(email), phone)
        } else {
            (None, Some(values.unique_phone(rng)?))
        };

        let identity = Identity {
            id,
            email,
            phone,
            password_hash: values.password_digest(rng),
            role,
            is_verified: role.implies_verified(),
        };

        Ok(GeneratedIdentity {
            identity,
            profile: self.generate_profile(id, values, rng),
        })
    }

    /// Generates `count` identities and partitions out the eligible posters.
    pub fn generate_pool(
        &self,
        count: usize,
        values: &mut ValueSource,
        rng: &mut impl Rng,
    ) -> Result<IdentityPool, SeedError> {
        info!("Generating {} identities...", count);

        let mut pool = IdentityPool {
            identities: Vec::with_capacity(count),
            profiles: Vec::with_capacity(count),
            ids: Vec::with_capacity(count),
            eligible_posters: Vec::new(),
        };

        for _ in 0..count {
            let generated = self.generate(values, rng)?;

            pool.ids.push(generated.identity.id);
            if generated.identity.is_eligible_poster() {
                pool.eligible_posters.push(generated.identity.id);
            }
            pool.identities.push(generated.identity);
            pool.profiles.push(generated.profile);
        }

        info!(
            "Eligible posters: {} / {}",
            pool.eligible_posters.len(),
            count
        );
        Ok(pool)
    }

    fn generate_profile(
        &self,
        identity_id: Uuid,
        values: &ValueSource,
        rng: &mut impl Rng,
    ) -> Profile {
        let name = values.person_name(rng);
        let bio = (rng.r#gen::<f64>() < self.config.bio_fill_rate).then(|| values.sentence(rng));
        let location =
            (rng.r#gen::<f64>() < self.config.location_fill_rate).then(|| values.city(rng));
        let avatar_url =
            (rng.r#gen::<f64>() < self.config.avatar_fill_rate).then(|| values.image_url(rng));

        let a = values.date_time_this_year(rng);
        let b = values.date_time_this_year(rng);

        Profile {
            identity_id,
            name,
            bio,
            location,
            avatar_url,
            created_at: a.min(b),
            last_active: a.max(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_identity() {
        let identity_gen = IdentityGenerator::new().unwrap();
        let mut values = ValueSource::new();
        let mut rng = rand::thread_rng();

        let generated = identity_gen.generate(&mut values, &mut rng).unwrap();

        assert_eq!(generated.profile.identity_id, generated.identity.id);
        assert!(!generated.profile.name.is_empty());
        assert_eq!(generated.identity.password_hash.len(), 64);
        assert!(generated.profile.created_at <= generated.profile.last_active);
    }

    #[test]
    fn test_role_implies_verified() {
        let identity_gen = IdentityGenerator::new().unwrap();
        let mut values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(3);

        let pool = identity_gen.generate_pool(500, &mut values, &mut rng).unwrap();

        for identity in &pool.identities {
            if matches!(identity.role, Role::Verified | Role::Admin) {
                assert!(identity.is_verified);
            } else {
                assert!(!identity.is_verified);
            }
            assert_ne!(identity.role, Role::Guest);
        }

        let members = pool
            .identities
            .iter()
            .filter(|i| i.role == Role::Member)
            .count();
        assert!(
            members > 330 && members < 470,
            "Expected ~80% members, got {members}/500"
        );
    }

    #[test]
    fn test_eligible_posters_match_predicate() {
        let identity_gen = IdentityGenerator::with_config(IdentityGenConfig {
            email_probability: 1.0,
            extra_phone_probability: 0.0,
            ..Default::default()
        })
        .unwrap();
        let mut values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(4);

        let pool = identity_gen.generate_pool(200, &mut values, &mut rng).unwrap();

        let expected: Vec<Uuid> = pool
            .identities
            .iter()
            .filter(|i| i.is_verified || i.email.is_some() || i.phone.is_some())
            .map(|i| i.id)
            .collect();
        assert_eq!(pool.eligible_posters, expected);
        assert_eq!(pool.ids.len(), 200);
        assert!(pool.identities.iter().all(|i| i.phone.is_none()));
    }

    #[test]
    fn test_handles_are_unique() {
        let identity_gen = IdentityGenerator::new().unwrap();
        let mut values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(5);

        let pool = identity_gen.generate_pool(1000, &mut values, &mut rng).unwrap();

        let emails: Vec<&String> = pool
            .identities
            .iter()
            .filter_map(|i| i.email.as_ref())
            .collect();
        let phones: Vec<&String> = pool
            .identities
            .iter()
            .filter_map(|i| i.phone.as_ref())
            .collect();
        assert_eq!(emails.iter().collect::<HashSet<_>>().len(), emails.len());
        assert_eq!(phones.iter().collect::<HashSet<_>>().len(), phones.len());

        // Every branch sets at least one handle
        assert!(
            pool.identities
                .iter()
                .all(|i| i.email.is_some() || i.phone.is_some())
        );
    }
}
