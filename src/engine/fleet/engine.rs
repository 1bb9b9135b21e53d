//! Fleet Engine
//!
//! Owns the device registry, both channel stores and the update metrics.
//! Created once at startup and handed by reference to whatever needs it.

use tracing::info;

use super::channel::{ChannelKind, ChannelStore};
use super::error::Result;
use super::registry::Registry;
use super::view::{EndpointView, NodeView};
use crate::engine::config::FleetConfig;
use crate::engine::observability::UpdateMetrics;

#[derive(Debug, Default)]
pub struct FleetEngine {
    pub(super) registry: Registry,
    pub(super) ota: ChannelStore,
    pub(super) dfu: ChannelStore,
    pub(super) metrics: UpdateMetrics,
}

impl FleetEngine {
    /// Seed a fleet from its definition, with empty channels
    pub fn new(config: &FleetConfig) -> Result<Self> {
        let registry = Registry::from_config(config)?;
        info!(
            nodes = registry.node_count(),
            endpoints = registry.endpoint_count(),
            "fleet initialized"
        );
        Ok(Self {
            registry,
            ..Default::default()
        })
    }

    /// Drop all devices, channels and metrics and re-seed from `config`
    pub fn reset(&mut self, config: &FleetConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn metrics(&self) -> &UpdateMetrics {
        &self.metrics
    }

    // ========== Channels ==========

    fn channel_store(&self, kind: ChannelKind) -> &ChannelStore {
        match kind {
            ChannelKind::Ota => &self.ota,
            ChannelKind::Dfu => &self.dfu,
        }
    }

    fn channel_store_mut(&mut self, kind: ChannelKind) -> &mut ChannelStore {
        match kind {
            ChannelKind::Ota => &mut self.ota,
            ChannelKind::Dfu => &mut self.dfu,
        }
    }

    /// Queue an artifact. Always succeeds; validation happens on poll.
    pub fn post(&mut self, kind: ChannelKind, channel: &str, artifact: &str) {
        self.channel_store_mut(kind).post(channel, artifact);
    }

    /// Remove one queued copy of `artifact`
    pub fn clear(&mut self, kind: ChannelKind, channel: &str, artifact: &str) -> Result<()> {
        self.channel_store_mut(kind).clear(channel, artifact)
    }

    pub fn artifacts(&self, kind: ChannelKind, channel: &str) -> &[String] {
        self.channel_store(kind).artifacts(channel)
    }

    /// Every channel of `kind` that has seen a post, sorted
    pub fn channel_names(&self, kind: ChannelKind) -> Vec<String> {
        self.channel_store(kind).channel_names()
    }

    pub fn post_ota(&mut self, channel: &str, artifact: &str) {
        self.post(ChannelKind::Ota, channel, artifact);
    }

    pub fn post_dfu(&mut self, channel: &str, artifact: &str) {
        self.post(ChannelKind::Dfu, channel, artifact);
    }

    pub fn clear_ota(&mut self, channel: &str, artifact: &str) -> Result<()> {
        self.clear(ChannelKind::Ota, channel, artifact)
    }

    pub fn clear_dfu(&mut self, channel: &str, artifact: &str) -> Result<()> {
        self.clear(ChannelKind::Dfu, channel, artifact)
    }

    pub fn ota_artifacts(&self, channel: &str) -> &[String] {
        self.artifacts(ChannelKind::Ota, channel)
    }

    pub fn dfu_artifacts(&self, channel: &str) -> &[String] {
        self.artifacts(ChannelKind::Dfu, channel)
    }

    // ========== Endpoint state ==========

    pub fn set_endpoint_battery(&mut self, serial: &str, battery: u32) -> Result<()> {
        self.registry.endpoint_mut(serial)?.set_battery(battery);
        Ok(())
    }

    pub fn set_endpoint_backlog(&mut self, serial: &str, backlog: u32) -> Result<()> {
        self.registry.endpoint_mut(serial)?.set_backlog(backlog);
        Ok(())
    }

    // ========== Views ==========

    pub fn node_view(&self, uuid: &str) -> Result<NodeView> {
        let node = self.registry.node(uuid)?;
        Ok(NodeView::new(node, &self.registry))
    }

    pub fn endpoint_view(&self, serial: &str) -> Result<EndpointView> {
        self.registry.endpoint(serial).map(EndpointView::from)
    }

    /// Views of every node, ordered by uuid
    pub fn node_views(&self) -> Vec<NodeView> {
        self.registry
            .nodes()
            .map(|node| NodeView::new(node, &self.registry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fleet::FleetError;

    fn engine() -> FleetEngine {
        FleetEngine::new(&FleetConfig::default()).unwrap()
    }

    #[test]
    fn test_setters_overwrite_without_validation() {
        let mut fleet = engine();
        fleet.set_endpoint_battery("MOXA-EP1-0001", 0).unwrap();
        fleet.set_endpoint_backlog("MOXA-EP1-0001", 42).unwrap();

        let view = fleet.endpoint_view("MOXA-EP1-0001").unwrap();
        assert_eq!(view.battery, "0");
        assert_eq!(view.backlog, "42");
        assert!(view.last_error.is_none());
    }

    #[test]
    fn test_setters_unknown_endpoint() {
        let mut fleet = engine();
        assert_eq!(
            fleet.set_endpoint_battery("NOPE", 1),
            Err(FleetError::EndpointNotFound("NOPE".to_string()))
        );
    }

    #[test]
    fn test_channel_kinds_are_disjoint() {
        let mut fleet = engine();
        fleet.post_ota("SHARED", "moxa_34.swu");

        assert_eq!(fleet.ota_artifacts("SHARED"), ["moxa_34.swu"]);
        assert!(fleet.dfu_artifacts("SHARED").is_empty());
        assert_eq!(
            fleet.clear_dfu("SHARED", "moxa_34.swu"),
            Err(FleetError::ChannelNotFound("SHARED".to_string()))
        );
        fleet.clear_ota("SHARED", "moxa_34.swu").unwrap();

        assert_eq!(fleet.channel_names(ChannelKind::Ota), ["SHARED"]);
        assert!(fleet.channel_names(ChannelKind::Dfu).is_empty());
    }

    #[test]
    fn test_reset_reseeds() {
        let mut fleet = engine();
        fleet.post_ota("OTA_MOXA_TBCDB1045003", "moxa_34.swu");
        fleet.poll_node("MOXA_TBCDB1045003").unwrap();

        fleet.reset(&FleetConfig::default()).unwrap();
        assert_eq!(fleet.node_view("MOXA_TBCDB1045003").unwrap().version, "33");
        assert!(fleet.ota_artifacts("OTA_MOXA_TBCDB1045003").is_empty());
        assert_eq!(fleet.metrics().total_polls, 0);
    }

    #[test]
    fn test_node_views_sorted() {
        let uuids: Vec<String> = engine().node_views().into_iter().map(|v| v.uuid).collect();
        assert_eq!(uuids, ["AHN2_TBCDB1045001", "CASSIA_TBCDB1045002", "MOXA_TBCDB1045003"]);
    }
}
