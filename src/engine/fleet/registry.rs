//! Device Registry
//!
//! Identifier lookup for nodes and endpoints. Endpoints are stored flat by
//! serial; a node keeps the serials it owns and each endpoint keeps its node's
//! uuid, so neither side holds a reference to the other.

use std::collections::BTreeMap;

use super::device::{Endpoint, Node};
use super::error::{FleetError, Result};
use crate::engine::config::FleetConfig;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    nodes: BTreeMap<String, Node>,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a fleet definition
    pub fn from_config(config: &FleetConfig) -> Result<Self> {
        let mut registry = Self::new();
        for node_cfg in &config.nodes {
            registry.insert_node(Node::new(
                node_cfg.name,
                node_cfg.uuid.clone(),
                node_cfg.version,
            ))?;
            for ep in &node_cfg.endpoints {
                registry.attach_endpoint(Endpoint::new(
                    ep.serial_number.clone(),
                    ep.hardware_type,
                    ep.version,
                    ep.battery,
                    ep.backlog,
                    node_cfg.uuid.clone(),
                ))?;
            }
        }
        Ok(registry)
    }

    pub fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(node.uuid()) {
            return Err(FleetError::DuplicateIdentifier(node.uuid().to_string()));
        }
        self.nodes.insert(node.uuid().to_string(), node);
        Ok(())
    }

    /// Register an endpoint under the node named by its `node_uuid`
    pub fn attach_endpoint(&mut self, endpoint: Endpoint) -> Result<()> {
        let serial = endpoint.serial_number().to_string();
        if self.endpoints.contains_key(&serial) {
            return Err(FleetError::DuplicateIdentifier(serial));
        }

        let node = self
            .nodes
            .get_mut(endpoint.node_uuid())
            .ok_or_else(|| FleetError::NodeNotFound(endpoint.node_uuid().to_string()))?;
        node.add_endpoint(serial.clone());

        self.endpoints.insert(serial, endpoint);
        Ok(())
    }

    pub fn node(&self, uuid: &str) -> Result<&Node> {
        self.nodes
            .get(uuid)
            .ok_or_else(|| FleetError::NodeNotFound(uuid.to_string()))
    }

    pub fn node_mut(&mut self, uuid: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(uuid)
            .ok_or_else(|| FleetError::NodeNotFound(uuid.to_string()))
    }

    pub fn endpoint(&self, serial: &str) -> Result<&Endpoint> {
        self.endpoints
            .get(serial)
            .ok_or_else(|| FleetError::EndpointNotFound(serial.to_string()))
    }

    pub fn endpoint_mut(&mut self, serial: &str) -> Result<&mut Endpoint> {
        self.endpoints
            .get_mut(serial)
            .ok_or_else(|| FleetError::EndpointNotFound(serial.to_string()))
    }

    /// All nodes, ordered by uuid
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Endpoints owned by `node`, in attach order
    pub fn endpoints_of<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Endpoint> + 'a {
        node.endpoints()
            .iter()
            .filter_map(move |serial| self.endpoints.get(serial))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}
