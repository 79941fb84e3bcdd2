//! Persistence for generated data.
//!
//! The [`Seeder`] writes generated entities through a [`Store`]: either
//! [`PgStore`] for a live database or [`MemoryStore`] for dry runs and tests.

mod memory;
mod postgres;
mod seeder;
mod store;

pub use memory::{MemoryStore, Tables};
pub use postgres::PgStore;
pub use seeder::{DEFAULT_BATCH_SIZE, Seeder};
pub use store::{Batch, Store, Table};
