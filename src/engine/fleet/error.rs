//! Fleet Error Types
//!
//! Two tiers: `UpdateError` is a classification recorded on the target device,
//! `FleetError` is returned synchronously to whoever made the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Why an update was not applied. Stored as the device's `last_error`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateError {
    #[error("EMPTY_ARTIFACT")]
    EmptyArtifact,

    #[error("BACKLOG_NOT_EMPTY")]
    BacklogNotEmpty,

    #[error("LOW_BATTERY")]
    LowBattery,

    #[error("BAD_FIRMWARE")]
    BadFirmware,

    #[error("BAD_ARTIFACT_FORMAT")]
    BadArtifactFormat,

    #[error("VERSION_NOT_NEWER")]
    VersionNotNewer,

    /// Set by dispatch when the channel is empty, never by the device rule.
    #[error("NO_ARTIFACT")]
    NoArtifact,
}

impl UpdateError {
    pub fn token(&self) -> &'static str {
        match self {
            Self::EmptyArtifact => "EMPTY_ARTIFACT",
            Self::BacklogNotEmpty => "BACKLOG_NOT_EMPTY",
            Self::LowBattery => "LOW_BATTERY",
            Self::BadFirmware => "BAD_FIRMWARE",
            Self::BadArtifactFormat => "BAD_ARTIFACT_FORMAT",
            Self::VersionNotNewer => "VERSION_NOT_NEWER",
            Self::NoArtifact => "NO_ARTIFACT",
        }
    }
}

/// Request-shape errors. These never touch a device's `last_error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FleetError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Artifact {artifact} not present in channel {channel}")]
    ArtifactNotInChannel { channel: String, artifact: String },

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),
}

pub type Result<T> = std::result::Result<T, FleetError>;
