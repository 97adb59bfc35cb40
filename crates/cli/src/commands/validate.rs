//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ClientBlueprint, ComponentGroup};
use remote_scene::robots;
use serde::Serialize;
use tracing::info;

use super::{describe_convention, load_blueprint};
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    address: String,
    proximity_convention: String,
    collection_count: usize,
    component_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    address: blueprint.link.address.clone(),
                    proximity_convention: describe_convention(
                        blueprint.sensors.proximity_convention,
                    ),
                    collection_count: blueprint.collections.len(),
                    component_count: blueprint
                        .collections
                        .iter()
                        .map(|c| c.component_count())
                        .sum(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &ClientBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let builtin: Vec<String> = robots::builtin_definitions()
        .into_iter()
        .map(|def| def.name)
        .collect();

    for collection in &blueprint.collections {
        if builtin.contains(&collection.name) {
            warnings.push(format!(
                "Collection '{}' replaces the built-in definition of the same name",
                collection.name
            ));
        }

        if collection.component_count() == 0 {
            warnings.push(format!(
                "Collection '{}' declares no components besides its root",
                collection.name
            ));
        }

        if collection.proximity_convention.is_some()
            && collection.mapping(ComponentGroup::ProximitySensors).is_empty()
        {
            warnings.push(format!(
                "Collection '{}' sets a proximity convention but has no proximity sensors",
                collection.name
            ));
        }
    }

    if blueprint.link.settings.connect_timeout_ms < blueprint.link.settings.comm_thread_cycle_ms {
        warnings.push(
            "link.settings.connect_timeout_ms is shorter than one communication cycle".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Server: {}", summary.address);
            println!("  Proximity convention: {}", summary.proximity_convention);
            println!("  Collections: {}", summary.collection_count);
            println!("  Components: {}", summary.component_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
