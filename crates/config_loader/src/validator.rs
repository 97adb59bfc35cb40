//! Configuration validation
//!
//! Rules:
//! - link address parses as `ip[:port]`
//! - comm_thread_cycle_ms > 0, connect_timeout_ms > 0
//! - collection names unique and non-empty
//! - collection root and every object name non-empty
//! - no object name repeated inside one mapping
//! - normalized proximity conventions have a finite max_distance > 0

use std::collections::HashSet;

use contracts::{
    CollectionDefinition, ComponentGroup, ContractError, LinkConfig, ProximityConvention,
    SensorDefaults,
};

/// Validate a single collection definition
pub fn validate_collection(collection: &CollectionDefinition) -> Result<(), ContractError> {
    if collection.root.trim().is_empty() {
        return Err(ContractError::config_validation(
            format!("collections[{}].root", collection.name),
            "root object name cannot be empty",
        ));
    }

    for group in ComponentGroup::ALL {
        let mut seen = HashSet::new();
        for (key, name) in collection.mapping(group).entries() {
            let field = format!("collections[{}].{}{}", collection.name, group, key);
            if name.trim().is_empty() {
                return Err(ContractError::config_validation(
                    field,
                    "object name cannot be empty",
                ));
            }
            if !seen.insert(name) {
                return Err(ContractError::config_validation(
                    field,
                    format!("duplicate object name '{name}'"),
                ));
            }
        }
    }

    if let Some(convention) = collection.proximity_convention {
        validate_convention(
            &format!("collections[{}].proximity_convention", collection.name),
            convention,
        )?;
    }

    Ok(())
}

pub(crate) fn validate_link(link: &LinkConfig) -> Result<(), ContractError> {
    link.parsed_address()
        .map_err(|e| ContractError::config_validation("link.address", e.to_string()))?;

    if link.settings.comm_thread_cycle_ms == 0 {
        return Err(ContractError::config_validation(
            "link.settings.comm_thread_cycle_ms",
            "comm_thread_cycle_ms must be > 0",
        ));
    }

    if link.settings.connect_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "link.settings.connect_timeout_ms",
            "connect_timeout_ms must be > 0",
        ));
    }

    Ok(())
}

pub(crate) fn validate_sensor_defaults(sensors: &SensorDefaults) -> Result<(), ContractError> {
    validate_convention("sensors.proximity_convention", sensors.proximity_convention)
}

/// Collection names must be non-empty and unique across the blueprint
pub(crate) fn validate_collection_names(
    collections: &[CollectionDefinition],
) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, collection) in collections.iter().enumerate() {
        if collection.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("collections[{idx}].name"),
                "collection name cannot be empty",
            ));
        }
        if !seen.insert(collection.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("collections[name={}]", collection.name),
                "duplicate collection name",
            ));
        }
    }
    Ok(())
}

fn validate_convention(field: &str, convention: ProximityConvention) -> Result<(), ContractError> {
    if let ProximityConvention::Normalized { max_distance } = convention {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(ContractError::config_validation(
                format!("{field}.max_distance"),
                format!("max_distance must be finite and > 0, got {max_distance}"),
            ));
        }
    }
    Ok(())
}
