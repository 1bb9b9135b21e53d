//! Device Model
//!
//! Nodes (gateways) take firmware over OTA, endpoints (sensors) over DFU.
//! Both run the same validation rule. What differs per kind is captured in an
//! `UpdatePolicy`: the expected artifact tag plus the optional backlog and
//! battery gates that only endpoints carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::artifact::Artifact;
use super::channel::ChannelKind;
use super::error::UpdateError;

/// Minimum battery for EP1/EP2 endpoints
pub const STANDARD_BATTERY_THRESHOLD: u32 = 2500;

/// Minimum battery for canary endpoints
pub const CANARY_BATTERY_THRESHOLD: u32 = 3600;

pub const MOXA_API_HOST: &str = "moxa_api.azure";
pub const BUILDROOT_API_HOST: &str = "buildroot_api.azure";

/// Gateway device family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum NodeFamily {
    Ahn2,
    Cassia,
    Moxa,
}

impl NodeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeFamily::Ahn2 => "AHN2",
            NodeFamily::Cassia => "CASSIA",
            NodeFamily::Moxa => "MOXA",
        }
    }

    /// Routing host for this family's update backend
    pub fn api_host(&self) -> &'static str {
        match self {
            NodeFamily::Moxa => MOXA_API_HOST,
            NodeFamily::Ahn2 | NodeFamily::Cassia => BUILDROOT_API_HOST,
        }
    }
}

impl FromStr for NodeFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AHN2" => Ok(NodeFamily::Ahn2),
            "CASSIA" => Ok(NodeFamily::Cassia),
            "MOXA" => Ok(NodeFamily::Moxa),
            other => Err(format!("unknown node family: {}", other)),
        }
    }
}

impl TryFrom<String> for NodeFamily {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for NodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint hardware type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HardwareType {
    Ep1,
    Ep2,
    Canary,
}

impl HardwareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareType::Ep1 => "EP1",
            HardwareType::Ep2 => "EP2",
            HardwareType::Canary => "CANARY",
        }
    }

    /// Inclusive lower bound on battery for an update to be accepted
    pub fn battery_threshold(&self) -> u32 {
        match self {
            HardwareType::Canary => CANARY_BATTERY_THRESHOLD,
            HardwareType::Ep1 | HardwareType::Ep2 => STANDARD_BATTERY_THRESHOLD,
        }
    }
}

impl FromStr for HardwareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EP1" => Ok(HardwareType::Ep1),
            "EP2" => Ok(HardwareType::Ep2),
            "CANARY" => Ok(HardwareType::Canary),
            other => Err(format!("unknown hardware type: {}", other)),
        }
    }
}

impl TryFrom<String> for HardwareType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for HardwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Battery reading paired with the threshold it must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryGate {
    pub level: u32,
    pub threshold: u32,
}

/// Per-kind parameters of the update rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePolicy {
    pub expected_tag: &'static str,
    /// Pending work count; any non-zero value blocks the update
    pub backlog: Option<u32>,
    pub battery: Option<BatteryGate>,
}

impl UpdatePolicy {
    /// Decide whether `artifact` may replace `current_version`.
    ///
    /// Checks run in a fixed order and the first failure wins: empty artifact,
    /// backlog, battery, prefix, version format, version ordering. On success
    /// the new version is returned; nothing is mutated here.
    pub fn evaluate(&self, artifact: &str, current_version: u64) -> Result<u64, UpdateError> {
        if artifact.is_empty() {
            return Err(UpdateError::EmptyArtifact);
        }

        if matches!(self.backlog, Some(pending) if pending > 0) {
            return Err(UpdateError::BacklogNotEmpty);
        }

        if let Some(gate) = self.battery {
            if gate.level < gate.threshold {
                return Err(UpdateError::LowBattery);
            }
        }

        if !Artifact::has_prefix(artifact, self.expected_tag) {
            return Err(UpdateError::BadFirmware);
        }

        let parsed = Artifact::parse(artifact)?;
        if parsed.version <= current_version {
            return Err(UpdateError::VersionNotNewer);
        }

        Ok(parsed.version)
    }
}

/// A device that can receive firmware through a channel
pub trait UpdateTarget {
    fn policy(&self) -> UpdatePolicy;
    fn channel_kind(&self) -> ChannelKind;
    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn last_error(&self) -> Option<UpdateError>;

    fn set_version(&mut self, version: u64);
    fn set_last_error(&mut self, error: Option<UpdateError>);

    /// Name of the channel this device polls
    fn channel_name(&self) -> String {
        self.channel_kind().channel_name(self.id())
    }

    /// Validate `artifact` and, if accepted, advance the version.
    ///
    /// A failure records exactly one error token and leaves the version alone;
    /// success clears `last_error`.
    fn apply_update(&mut self, artifact: &str) -> bool {
        match self.policy().evaluate(artifact, self.version()) {
            Ok(version) => {
                self.set_version(version);
                self.set_last_error(None);
                true
            }
            Err(error) => {
                self.set_last_error(Some(error));
                false
            }
        }
    }
}

/// A gateway. Owns its endpoints by serial number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: NodeFamily,
    uuid: String,
    version: u64,
    last_error: Option<UpdateError>,
    endpoints: Vec<String>,
}

impl Node {
    pub fn new(name: NodeFamily, uuid: impl Into<String>, version: u64) -> Self {
        Self {
            name,
            uuid: uuid.into(),
            version,
            last_error: None,
            endpoints: Vec::new(),
        }
    }

    pub fn name(&self) -> NodeFamily {
        self.name
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Serial numbers of owned endpoints, in attach order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn add_endpoint(&mut self, serial_number: impl Into<String>) {
        self.endpoints.push(serial_number.into());
    }

    pub fn api_host(&self) -> &'static str {
        self.name.api_host()
    }
}

impl UpdateTarget for Node {
    fn policy(&self) -> UpdatePolicy {
        UpdatePolicy {
            expected_tag: self.name.as_str(),
            backlog: None,
            battery: None,
        }
    }

    fn channel_kind(&self) -> ChannelKind {
        ChannelKind::Ota
    }

    fn id(&self) -> &str {
        &self.uuid
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn last_error(&self) -> Option<UpdateError> {
        self.last_error
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn set_last_error(&mut self, error: Option<UpdateError>) {
        self.last_error = error;
    }
}

/// A sensor attached to exactly one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    serial_number: String,
    hardware_type: HardwareType,
    version: u64,
    battery: u32,
    backlog: u32,
    node_uuid: String,
    last_error: Option<UpdateError>,
}

impl Endpoint {
    pub fn new(
        serial_number: impl Into<String>,
        hardware_type: HardwareType,
        version: u64,
        battery: u32,
        backlog: u32,
        node_uuid: impl Into<String>,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            hardware_type,
            version,
            battery,
            backlog,
            node_uuid: node_uuid.into(),
            last_error: None,
        }
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn hardware_type(&self) -> HardwareType {
        self.hardware_type
    }

    pub fn battery(&self) -> u32 {
        self.battery
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    /// Identifier of the owning node
    pub fn node_uuid(&self) -> &str {
        &self.node_uuid
    }

    /// Overwrites the battery reading. Checked only when an update is applied.
    pub fn set_battery(&mut self, battery: u32) {
        self.battery = battery;
    }

    /// Overwrites the backlog count. Checked only when an update is applied.
    pub fn set_backlog(&mut self, backlog: u32) {
        self.backlog = backlog;
    }
}

impl UpdateTarget for Endpoint {
    fn policy(&self) -> UpdatePolicy {
        UpdatePolicy {
            expected_tag: self.hardware_type.as_str(),
            backlog: Some(self.backlog),
            battery: Some(BatteryGate {
                level: self.battery,
                threshold: self.hardware_type.battery_threshold(),
            }),
        }
    }

    fn channel_kind(&self) -> ChannelKind {
        ChannelKind::Dfu
    }

    fn id(&self) -> &str {
        &self.serial_number
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn last_error(&self) -> Option<UpdateError> {
        self.last_error
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn set_last_error(&mut self, error: Option<UpdateError>) {
        self.last_error = error;
    }
}
