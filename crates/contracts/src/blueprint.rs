//! ClientBlueprint - Config Loader output
//!
//! Describes how to reach the simulation server, how sensor values are interpreted,
//! and which named collections are known to the client.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CollectionDefinition, ContractError, ProximityConvention};

/// Port used when the address omits one
pub const DEFAULT_PORT: u16 = 19997;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub sensors: SensorDefaults,

    /// Additional collection definitions (built-in robots are always available)
    #[serde(default)]
    pub collections: Vec<CollectionDefinition>,
}

/// Remote API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// `a.b.c.d[:port]`
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default)]
    pub settings: LinkSettings,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            settings: LinkSettings::default(),
        }
    }
}

impl LinkConfig {
    pub fn parsed_address(&self) -> Result<LinkAddress, ContractError> {
        self.address.parse()
    }
}

fn default_address() -> String {
    format!("127.0.0.1:{DEFAULT_PORT}")
}

/// Knobs passed to the link when connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Milliseconds between two packet flushes of the communication thread
    #[serde(default = "default_comm_thread_cycle_ms")]
    pub comm_thread_cycle_ms: u32,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u32,

    #[serde(default = "default_true")]
    pub wait_until_connected: bool,

    #[serde(default = "default_true")]
    pub do_not_reconnect: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            comm_thread_cycle_ms: default_comm_thread_cycle_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            wait_until_connected: true,
            do_not_reconnect: true,
        }
    }
}

fn default_comm_thread_cycle_ms() -> u32 {
    5
}

fn default_connect_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

/// Sensor interpretation defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorDefaults {
    #[serde(default)]
    pub proximity_convention: ProximityConvention,
}

/// Parsed `ip[:port]` server address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl FromStr for LinkAddress {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, port) = match s.split_once(':') {
            Some((ip, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| ContractError::invalid_address(s, format!("bad port: {e}")))?;
                (ip, port)
            }
            None => (s, DEFAULT_PORT),
        };

        let ip = ip
            .parse::<Ipv4Addr>()
            .map_err(|e| ContractError::invalid_address(s, format!("bad ip: {e}")))?;

        Ok(Self { ip, port })
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
