//! # Config Loader
//!
//! Loads the `ClientBlueprint` a simscene client connects with.
//!
//! A blueprint has three sections:
//! - `[link]`: server address and connection settings
//! - `[sensors]`: the session-wide proximity convention
//! - `[[collections]]`: robot definitions added to the built-in catalog
//!
//! TOML is the preferred format; JSON is accepted for generated files.
//!
//! Loading is parse first, then validation in order: link, sensor defaults,
//! collection names across the file, then each collection on its own. The first
//! failing check is reported with the dotted path of the offending field.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("simscene.toml")).unwrap();
//! println!("Server: {}", blueprint.link.address);
//! ```

mod parser;
mod validator;

pub use contracts::ClientBlueprint;
pub use parser::ConfigFormat;
pub use validator::validate_collection;

use contracts::ContractError;
use std::path::Path;

/// Blueprint loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint file, picking the format from its extension
    ///
    /// # Errors
    /// - Unknown or missing extension
    /// - Unreadable file
    /// - Parse or validation failure
    pub fn load_from_path(path: &Path) -> Result<ClientBlueprint, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;
        let format = ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate blueprint `content`
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ClientBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        Self::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Check a blueprint, whether loaded from a file or built in code
    pub fn validate(blueprint: &ClientBlueprint) -> Result<(), ContractError> {
        validator::validate_link(&blueprint.link)?;
        validator::validate_sensor_defaults(&blueprint.sensors)?;
        validator::validate_collection_names(&blueprint.collections)?;
        blueprint
            .collections
            .iter()
            .try_for_each(validator::validate_collection)
    }

    pub fn to_toml(blueprint: &ClientBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &ClientBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}
