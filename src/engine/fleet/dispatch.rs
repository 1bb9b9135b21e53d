//! Update Dispatch
//!
//! Feeds the newest artifact on a device's channel into its update rule.
//! Polling never drains the channel, so polling twice re-offers the same
//! artifact and the second attempt fails with `VERSION_NOT_NEWER`.

use tracing::{info, warn};

use super::channel::ChannelStore;
use super::device::UpdateTarget;
use super::engine::FleetEngine;
use super::error::{Result, UpdateError};
use crate::engine::observability::UpdateMetrics;

/// Apply the latest artifact on `channels` to `target`.
///
/// An empty channel records `NO_ARTIFACT` without running the update rule.
pub fn poll<T: UpdateTarget>(
    target: &mut T,
    channels: &ChannelStore,
    metrics: &mut UpdateMetrics,
) -> bool {
    let channel = target.channel_name();
    let from_version = target.version();

    let artifact = channels.peek_latest(&channel);
    let updated = match artifact {
        Some(artifact) => target.apply_update(artifact),
        None => {
            target.set_last_error(Some(UpdateError::NoArtifact));
            false
        }
    };

    let error = target.last_error();
    match error {
        None => info!(
            target_id = target.id(),
            channel = %channel,
            from = from_version,
            to = target.version(),
            "firmware applied"
        ),
        Some(err) => warn!(
            target_id = target.id(),
            channel = %channel,
            artifact = artifact.unwrap_or(""),
            reason = err.token(),
            "firmware rejected"
        ),
    }

    metrics.record_poll(
        target.id(),
        target.channel_kind(),
        artifact,
        from_version,
        target.version(),
        error,
    );

    updated
}

impl FleetEngine {
    /// Poll `OTA_<uuid>` for a node
    pub fn poll_node(&mut self, uuid: &str) -> Result<bool> {
        let node = self.registry.node_mut(uuid)?;
        Ok(poll(node, &self.ota, &mut self.metrics))
    }

    /// Poll `DFU_<serial>` for an endpoint
    pub fn poll_endpoint(&mut self, serial: &str) -> Result<bool> {
        let endpoint = self.registry.endpoint_mut(serial)?;
        Ok(poll(endpoint, &self.dfu, &mut self.metrics))
    }
}
