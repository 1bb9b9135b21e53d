//! Augury Configuration Module
//! Handles loading and validating augury.config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::fleet::{HardwareType, NodeFamily};

pub const CONFIG_FILE: &str = "augury.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

/// Devices created at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetConfig {
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    pub name: NodeFamily,
    pub uuid: String,
    pub version: u64,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    pub serial_number: String,
    pub hardware_type: HardwareType,
    pub version: u64,
    pub battery: u32,
    #[serde(default)]
    pub backlog: u32,
}

fn default_port() -> u16 {
    54330
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for FleetConfig {
    /// Three gateways at version 33, each with an EP1, an EP2 and a canary endpoint
    fn default() -> Self {
        let node = |name: NodeFamily, uuid: &str| NodeConfig {
            name,
            uuid: uuid.to_string(),
            version: 33,
            endpoints: vec![
                EndpointConfig::new(format!("{}-EP1-0001", name), HardwareType::Ep1, 10, 3000),
                EndpointConfig::new(format!("{}-EP2-0001", name), HardwareType::Ep2, 10, 3000),
                EndpointConfig::new(format!("{}-CANARY-0001", name), HardwareType::Canary, 5, 4000),
            ],
        };

        Self {
            nodes: vec![
                node(NodeFamily::Ahn2, "AHN2_TBCDB1045001"),
                node(NodeFamily::Cassia, "CASSIA_TBCDB1045002"),
                node(NodeFamily::Moxa, "MOXA_TBCDB1045003"),
            ],
        }
    }
}

impl EndpointConfig {
    pub fn new(
        serial_number: String,
        hardware_type: HardwareType,
        version: u64,
        battery: u32,
    ) -> Self {
        Self {
            serial_number,
            hardware_type,
            version,
            battery,
            backlog: 0,
        }
    }
}

impl Config {
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the default fleet
    pub fn load_or_default(project_dir: &Path) -> Result<Self, ConfigError> {
        match Self::load(project_dir) {
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_fleet_matches_bootstrap() {
        let fleet = FleetConfig::default();
        assert_eq!(fleet.nodes.len(), 3);
        assert!(fleet.nodes.iter().all(|n| n.version == 33 && n.endpoints.len() == 3));

        let moxa = &fleet.nodes[2];
        assert_eq!(moxa.uuid, "MOXA_TBCDB1045003");
        assert_eq!(moxa.endpoints[2].serial_number, "MOXA-CANARY-0001");
        assert_eq!(moxa.endpoints[2].version, 5);
        assert_eq!(moxa.endpoints[2].battery, 4000);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::NotFound(_))));

        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.api.port, 54330);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.api.port = 8080;
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api.port, 8080);
        assert_eq!(loaded.fleet, config.fleet);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let raw = r#"{
            "fleet": {
                "nodes": [
                    {
                        "name": "moxa",
                        "uuid": "M1",
                        "version": 1,
                        "endpoints": [
                            {
                                "serial_number": "E1",
                                "hardware_type": "canary",
                                "version": 2,
                                "battery": 3700
                            }
                        ]
                    }
                ]
            }
        }"#;
        std::fs::write(dir.path().join(CONFIG_FILE), raw).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.fleet.nodes[0].name, NodeFamily::Moxa);
        let endpoint = &config.fleet.nodes[0].endpoints[0];
        assert_eq!(endpoint.hardware_type, HardwareType::Canary);
        assert_eq!(endpoint.backlog, 0);
    }

    #[test]
    fn test_unknown_hardware_type_rejected() {
        let dir = tempdir().unwrap();
        let raw = r#"{ "fleet": { "nodes": [ { "name": "MOXA", "uuid": "M1", "version": 1,
            "endpoints": [ { "serial_number": "E1", "hardware_type": "EP9",
                             "version": 2, "battery": 1 } ] } ] } }"#;
        std::fs::write(dir.path().join(CONFIG_FILE), raw).unwrap();

        assert!(matches!(Config::load(dir.path()), Err(ConfigError::ParseError(_))));
    }
}
