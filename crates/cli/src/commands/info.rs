//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ClientBlueprint, CollectionDefinition, ComponentGroup};
use remote_scene::robots;
use serde::Serialize;
use tracing::info;

use super::{describe_convention, load_blueprint};
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    link: LinkInfo,
    proximity_convention: String,
    collections: Vec<CollectionInfo>,
}

#[derive(Serialize)]
struct LinkInfo {
    address: String,
    comm_thread_cycle_ms: u32,
    connect_timeout_ms: u32,
    wait_until_connected: bool,
    do_not_reconnect: bool,
}

#[derive(Serialize)]
struct CollectionInfo {
    name: String,
    root: String,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proximity_convention: Option<String>,
    proximity_sensors: usize,
    vision_sensors: usize,
    joints: usize,
    shapes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<ComponentInfo>,
}

#[derive(Serialize)]
struct ComponentInfo {
    group: ComponentGroup,
    key: String,
    object: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration info");
            load_blueprint(path)?
        }
        None => {
            info!("No configuration given, showing defaults");
            ClientBlueprint::default()
        }
    };

    let info = build_config_info(&blueprint, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

/// Collections the client would know: built-ins first, then configured ones
/// (a configured collection replaces a built-in of the same name)
fn catalog(
    blueprint: &ClientBlueprint,
    include_builtin: bool,
) -> Vec<(CollectionDefinition, &'static str)> {
    let mut catalog: Vec<(CollectionDefinition, &'static str)> = Vec::new();
    if include_builtin {
        catalog.extend(
            robots::builtin_definitions()
                .into_iter()
                .filter(|def| !blueprint.collections.iter().any(|c| c.name == def.name))
                .map(|def| (def, "builtin")),
        );
    }
    catalog.extend(
        blueprint
            .collections
            .iter()
            .cloned()
            .map(|def| (def, "config")),
    );
    catalog
}

fn build_config_info(blueprint: &ClientBlueprint, args: &InfoArgs) -> ConfigInfo {
    let collections = catalog(blueprint, !args.no_builtin)
        .into_iter()
        .map(|(def, source)| {
            let components = if args.components {
                ComponentGroup::ALL
                    .iter()
                    .flat_map(|group| {
                        def.mapping(*group)
                            .entries()
                            .into_iter()
                            .map(|(key, object)| ComponentInfo {
                                group: *group,
                                key: key.to_string(),
                                object: object.to_string(),
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect()
            } else {
                Vec::new()
            };

            CollectionInfo {
                name: def.name.clone(),
                root: def.root.clone(),
                source,
                proximity_convention: def.proximity_convention.map(describe_convention),
                proximity_sensors: def.proximity_sensors.len(),
                vision_sensors: def.vision_sensors.len(),
                joints: def.joints.len(),
                shapes: def.shapes.len(),
                components,
            }
        })
        .collect();

    let settings = &blueprint.link.settings;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        link: LinkInfo {
            address: blueprint.link.address.clone(),
            comm_thread_cycle_ms: settings.comm_thread_cycle_ms,
            connect_timeout_ms: settings.connect_timeout_ms,
            wait_until_connected: settings.wait_until_connected,
            do_not_reconnect: settings.do_not_reconnect,
        },
        proximity_convention: describe_convention(blueprint.sensors.proximity_convention),
        collections,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  simscene Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔌 Link");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Server: {}", info.link.address);
    println!(
        "   ├─ Cycle / timeout: {} ms / {} ms",
        info.link.comm_thread_cycle_ms, info.link.connect_timeout_ms
    );
    println!(
        "   └─ Wait until connected: {}, reconnect: {}",
        info.link.wait_until_connected, !info.link.do_not_reconnect
    );

    println!("\n📡 Sensors");
    println!("   └─ Proximity convention: {}", info.proximity_convention);

    println!("\n🤖 Collections ({})", info.collections.len());
    for (i, collection) in info.collections.iter().enumerate() {
        let is_last = i == info.collections.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} (root {}, {})",
            prefix, collection.name, collection.root, collection.source
        );
        println!(
            "   {}  ├─ {} proximity, {} vision, {} joints, {} shapes",
            child_prefix,
            collection.proximity_sensors,
            collection.vision_sensors,
            collection.joints,
            collection.shapes
        );
        let convention = collection
            .proximity_convention
            .as_deref()
            .unwrap_or("(session default)");
        if collection.components.is_empty() {
            println!("   {}  └─ Proximity convention: {}", child_prefix, convention);
            continue;
        }

        println!("   {}  ├─ Proximity convention: {}", child_prefix, convention);
        for (j, component) in collection.components.iter().enumerate() {
            let component_prefix = if j == collection.components.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {}  {} {} {} → {}",
                child_prefix, component_prefix, component.group, component.key, component.object
            );
        }
    }

    println!();
}
