//! Seed pools, the per-type value generator, and the combination engine.

pub mod combination_engine;
pub mod seed_pool;
pub mod value_generator;

pub use combination_engine::combine;
pub use seed_pool::{SeedPaths, SeedPool, SeedPoolError};
pub use value_generator::generate_candidates;
