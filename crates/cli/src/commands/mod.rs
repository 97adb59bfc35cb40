//! Command implementations.

mod info;
mod validate;

pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use contracts::ClientBlueprint;

use crate::error::{CliError, Result};

/// Load and validate the blueprint at `path`
fn load_blueprint(path: &Path) -> Result<ClientBlueprint> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(CliError::config_not_found(display));
    }
    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::invalid_config(display, e))
}

/// Short human description of a proximity convention
fn describe_convention(convention: contracts::ProximityConvention) -> String {
    use contracts::ProximityConvention;

    match convention {
        ProximityConvention::Distance => "distance".to_string(),
        ProximityConvention::InverseDistance => "inverse_distance".to_string(),
        ProximityConvention::Normalized { max_distance } => {
            format!("normalized (max {max_distance})")
        }
    }
}
