//! Fluent builder APIs for seeding scenarios.
//!
//! The [`ScenarioBuilder`] provides a convenient way to construct a complete
//! social graph and seed it phase by phase.

mod scenario;

pub use scenario::{ScenarioBuilder, ScenarioMetrics, ScenarioResult};
