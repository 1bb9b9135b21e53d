//! Read Views
//!
//! Snapshots of device state for the API and CLI. Numbers are rendered as
//! strings here; the model itself stays integer-typed.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::device::{Endpoint, Node, UpdateTarget};
use super::error::UpdateError;
use super::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NodeView {
    pub uuid: String,
    pub ota_channel: String,
    pub version: String,
    pub api_host: String,
    pub last_error: Option<UpdateError>,
    #[serde(rename = "Endpoints")]
    pub endpoints: Vec<EndpointSummary>,
}

/// Endpoint row nested in a `NodeView`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EndpointSummary {
    pub serial_number: String,
    pub hardware_type: String,
    pub version: String,
    pub battery: String,
    pub backlog: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EndpointView {
    pub serial_number: String,
    pub battery: String,
    pub hardware_type: String,
    /// Owning node
    pub uuid: String,
    pub version: String,
    pub backlog: String,
    pub last_error: Option<UpdateError>,
}

impl NodeView {
    pub fn new(node: &Node, registry: &Registry) -> Self {
        Self {
            uuid: node.uuid().to_string(),
            ota_channel: node.channel_name(),
            version: node.version().to_string(),
            api_host: node.api_host().to_string(),
            last_error: node.last_error(),
            endpoints: registry.endpoints_of(node).map(EndpointSummary::from).collect(),
        }
    }
}

impl From<&Endpoint> for EndpointSummary {
    fn from(ep: &Endpoint) -> Self {
        Self {
            serial_number: ep.serial_number().to_string(),
            hardware_type: ep.hardware_type().to_string(),
            version: ep.version().to_string(),
            battery: ep.battery().to_string(),
            backlog: ep.backlog().to_string(),
        }
    }
}

impl From<&Endpoint> for EndpointView {
    fn from(ep: &Endpoint) -> Self {
        Self {
            serial_number: ep.serial_number().to_string(),
            battery: ep.battery().to_string(),
            hardware_type: ep.hardware_type().to_string(),
            uuid: ep.node_uuid().to_string(),
            version: ep.version().to_string(),
            backlog: ep.backlog().to_string(),
            last_error: ep.last_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::FleetConfig;

    #[test]
    fn test_node_view_json_shape() {
        let registry = Registry::from_config(&FleetConfig::default()).unwrap();
        let node = registry.node("MOXA_TBCDB1045003").unwrap();
        let json = serde_json::to_value(NodeView::new(node, &registry)).unwrap();

        assert_eq!(json["uuid"], "MOXA_TBCDB1045003");
        assert_eq!(json["ota_channel"], "OTA_MOXA_TBCDB1045003");
        assert_eq!(json["version"], "33");
        assert_eq!(json["api_host"], "moxa_api.azure");
        assert!(json["last_error"].is_null());
        assert_eq!(json["Endpoints"].as_array().unwrap().len(), 3);
        assert_eq!(json["Endpoints"][0]["battery"], "3000");
    }

    #[test]
    fn test_other_families_route_to_buildroot() {
        let registry = Registry::from_config(&FleetConfig::default()).unwrap();
        let node = registry.node("CASSIA_TBCDB1045002").unwrap();
        assert_eq!(NodeView::new(node, &registry).api_host, "buildroot_api.azure");
    }

    #[test]
    fn test_endpoint_view() {
        let registry = Registry::from_config(&FleetConfig::default()).unwrap();
        let view = EndpointView::from(registry.endpoint("AHN2-CANARY-0001").unwrap());
        assert_eq!(view.hardware_type, "CANARY");
        assert_eq!(view.uuid, "AHN2_TBCDB1045001");
        assert_eq!(view.version, "5");
        assert_eq!(view.backlog, "0");
    }
}
