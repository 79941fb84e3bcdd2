//! Sampling primitives used by every generator.
//!
//! All draws go through the caller's RNG so a seeded run is reproducible.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, WeightedIndex};
use uuid::Uuid;

use crate::error::SeedError;

/// Draws `amount` distinct elements without replacement.
///
/// Fails when more elements are requested than the pool holds.
pub fn sample_distinct<T: Copy>(
    rng: &mut impl Rng,
    pool: &[T],
    amount: usize,
    what: &'static str,
) -> Result<Vec<T>, SeedError> {
    if amount > pool.len() {
        return Err(SeedError::SampleTooLarge {
            what,
            requested: amount,
            available: pool.len(),
        });
    }

    Ok(rand::seq::index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect())
}

/// Draws one element (with replacement across calls).
pub fn choose<T: Copy>(rng: &mut impl Rng, pool: &[T], what: &'static str) -> Result<T, SeedError> {
    pool.choose(rng).copied().ok_or(SeedError::EmptyPool(what))
}

/// Builds an id from RNG bytes so ids follow the run's seed.
pub fn new_id(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid()
}

/// Weighted choice over a fixed table of outcomes.
#[derive(Debug, Clone)]
pub struct Weighted<T> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Copy> Weighted<T> {
    pub fn new(table: &[(T, f64)]) -> Result<Self, SeedError> {
        let index = WeightedIndex::new(table.iter().map(|(_, w)| *w))?;
        Ok(Self {
            items: table.iter().map(|(item, _)| *item).collect(),
            index,
        })
    }

    pub fn sample(&self, rng: &mut impl Rng) -> T {
        self.items[self.index.sample(rng)]
    }
}
