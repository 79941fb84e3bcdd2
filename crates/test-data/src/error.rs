//! Error type shared by generators, stores and the seeder.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Config file error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {name}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Cannot sample {requested} distinct {what} from a population of {available}")]
    SampleTooLarge {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("No {0} available to draw from")]
    EmptyPool(&'static str),

    #[error("Ran out of unique {what} after {attempts} attempts")]
    UniquenessExhausted { what: &'static str, attempts: usize },

    #[error("Invalid weight table: {0}")]
    InvalidWeights(#[from] rand_distr::WeightedError),

    #[error("Constraint violation on {table}: {detail}")]
    Constraint { table: &'static str, detail: String },
}
