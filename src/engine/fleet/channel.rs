//! Channel Store
//!
//! Ordered queues of artifact identifiers keyed by channel name. The store does
//! not know about OTA vs DFU; the fleet keeps one store per kind.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::error::{FleetError, Result};

/// Update mechanism a channel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Over-the-air, node firmware
    Ota,
    /// Device firmware update, endpoint firmware
    Dfu,
}

impl ChannelKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ChannelKind::Ota => "OTA_",
            ChannelKind::Dfu => "DFU_",
        }
    }

    /// `OTA_<node uuid>` or `DFU_<endpoint serial>`
    pub fn channel_name(&self, target_id: &str) -> String {
        format!("{}{}", self.prefix(), target_id)
    }
}

/// Keyed collection of artifact queues
#[derive(Debug, Default, Clone)]
pub struct ChannelStore {
    channels: HashMap<String, Vec<String>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact, creating the channel if needed. Duplicates are kept.
    pub fn post(&mut self, channel: &str, artifact: &str) {
        let queue = self.channels.entry(channel.to_string()).or_default();
        queue.push(artifact.to_string());
        debug!(channel, artifact, depth = queue.len(), "artifact posted");
    }

    /// Remove the first occurrence of `artifact` from `channel`
    pub fn clear(&mut self, channel: &str, artifact: &str) -> Result<()> {
        let queue = self
            .channels
            .get_mut(channel)
            .ok_or_else(|| FleetError::ChannelNotFound(channel.to_string()))?;

        let index = queue
            .iter()
            .position(|queued| queued == artifact)
            .ok_or_else(|| FleetError::ArtifactNotInChannel {
                channel: channel.to_string(),
                artifact: artifact.to_string(),
            })?;

        queue.remove(index);
        debug!(channel, artifact, depth = queue.len(), "artifact cleared");
        Ok(())
    }

    /// Most recently posted artifact, if any
    pub fn peek_latest(&self, channel: &str) -> Option<&str> {
        self.channels
            .get(channel)
            .and_then(|queue| queue.last())
            .map(String::as_str)
    }

    /// Full queue contents, oldest first. Unknown channels read as empty.
    pub fn artifacts(&self, channel: &str) -> &[String] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known channel names, sorted. Channels emptied by clear stay listed.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }
}
