//! CollectionDefinition - declarative object groups
//!
//! A collection (typically a robot) maps role aliases or ordinal positions to
//! object names in the scene, grouped by component kind.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProximityConvention;

/// Fixed association from role keys to scene object names
///
/// In TOML a table declares an alias-keyed mapping, an array an ordinal one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameMapping {
    Aliased(BTreeMap<String, String>),
    Ordinal(Vec<String>),
}

impl Default for NameMapping {
    fn default() -> Self {
        NameMapping::Aliased(BTreeMap::new())
    }
}

/// Key used to address one entry of a [`NameMapping`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MappingKey {
    Alias(String),
    Index(usize),
}

/// Why a key could not be looked up in a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMiss {
    /// Ordinal mapping addressed past its end
    OutOfRange { len: usize },
    /// Alias not declared, or key style does not match the mapping style
    NotInMapping,
}

impl NameMapping {
    pub fn len(&self) -> usize {
        match self {
            NameMapping::Aliased(map) => map.len(),
            NameMapping::Ordinal(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(self, NameMapping::Ordinal(_))
    }

    /// Look up the object name declared for `key`
    pub fn lookup(&self, key: &MappingKey) -> Result<&str, MappingMiss> {
        match (self, key) {
            (NameMapping::Aliased(map), MappingKey::Alias(alias)) => map
                .get(alias)
                .map(String::as_str)
                .ok_or(MappingMiss::NotInMapping),
            (NameMapping::Ordinal(names), MappingKey::Index(index)) => names
                .get(*index)
                .map(String::as_str)
                .ok_or(MappingMiss::OutOfRange { len: names.len() }),
            _ => Err(MappingMiss::NotInMapping),
        }
    }

    /// Entries in declaration order (ordinal) or alias order (aliased)
    pub fn entries(&self) -> Vec<(MappingKey, &str)> {
        match self {
            NameMapping::Aliased(map) => map
                .iter()
                .map(|(alias, name)| (MappingKey::Alias(alias.clone()), name.as_str()))
                .collect(),
            NameMapping::Ordinal(names) => names
                .iter()
                .enumerate()
                .map(|(index, name)| (MappingKey::Index(index), name.as_str()))
                .collect(),
        }
    }

    /// Object names only
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let names: Vec<&str> = match self {
            NameMapping::Aliased(map) => map.values().map(String::as_str).collect(),
            NameMapping::Ordinal(names) => names.iter().map(String::as_str).collect(),
        };
        names.into_iter()
    }
}

impl From<&str> for MappingKey {
    fn from(alias: &str) -> Self {
        MappingKey::Alias(alias.to_string())
    }
}

impl From<String> for MappingKey {
    fn from(alias: String) -> Self {
        MappingKey::Alias(alias)
    }
}

impl From<usize> for MappingKey {
    fn from(index: usize) -> Self {
        MappingKey::Index(index)
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingKey::Alias(alias) => write!(f, "'{alias}'"),
            MappingKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Component group of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentGroup {
    ProximitySensors,
    VisionSensors,
    Joints,
    Shapes,
}

impl ComponentGroup {
    pub const ALL: [ComponentGroup; 4] = [
        ComponentGroup::ProximitySensors,
        ComponentGroup::VisionSensors,
        ComponentGroup::Joints,
        ComponentGroup::Shapes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentGroup::ProximitySensors => "proximity_sensors",
            ComponentGroup::VisionSensors => "vision_sensors",
            ComponentGroup::Joints => "joints",
            ComponentGroup::Shapes => "shapes",
        }
    }
}

impl fmt::Display for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative shape of a named collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDefinition {
    /// Collection name, e.g. "epuck"
    pub name: String,

    /// Object that must exist for an instance to exist
    pub root: String,

    #[serde(default)]
    pub proximity_sensors: NameMapping,

    #[serde(default)]
    pub vision_sensors: NameMapping,

    #[serde(default)]
    pub joints: NameMapping,

    #[serde(default)]
    pub shapes: NameMapping,

    /// Convention applied to this collection's proximity sensors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_convention: Option<ProximityConvention>,
}

impl CollectionDefinition {
    /// Empty definition rooted at `root`
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            proximity_sensors: NameMapping::default(),
            vision_sensors: NameMapping::default(),
            joints: NameMapping::default(),
            shapes: NameMapping::default(),
            proximity_convention: None,
        }
    }

    pub fn mapping(&self, group: ComponentGroup) -> &NameMapping {
        match group {
            ComponentGroup::ProximitySensors => &self.proximity_sensors,
            ComponentGroup::VisionSensors => &self.vision_sensors,
            ComponentGroup::Joints => &self.joints,
            ComponentGroup::Shapes => &self.shapes,
        }
    }

    /// Total number of declared components
    pub fn component_count(&self) -> usize {
        ComponentGroup::ALL
            .iter()
            .map(|group| self.mapping(*group).len())
            .sum()
    }
}

/// Scene name of `name` inside duplicate instance `instance`
///
/// Instance 0 is the original; the server names the k-th copy `name#{k-1}`.
pub fn instance_name(name: &str, instance: usize) -> String {
    match instance {
        0 => name.to_string(),
        k => format!("{name}#{}", k - 1),
    }
}
