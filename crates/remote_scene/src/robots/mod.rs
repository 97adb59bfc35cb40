//! Built-in robot collections

pub mod epuck;

use contracts::CollectionDefinition;

pub use epuck::{Bearing, EPuck, PairAngle, SensorPair};

/// Definitions every scene knows without configuration
pub fn builtin_definitions() -> Vec<CollectionDefinition> {
    vec![epuck::definition()]
}
