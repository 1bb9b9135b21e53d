//! Augury Fleet Engine
//!
//! Firmware delivery for a fleet of gateways and their sensors:
//! - `device` - Node/Endpoint model and the update validation rule
//! - `artifact` - Artifact name grammar (`<prefix>_<version>.<ext>`)
//! - `channel` - Ordered artifact queues (OTA for nodes, DFU for endpoints)
//! - `registry` - Identifier lookup
//! - `dispatch` - Polling a device against its channel
//! - `view` - Read-only snapshots for the API and CLI

pub mod artifact;
pub mod channel;
pub mod device;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod registry;
pub mod view;

pub use artifact::Artifact;
pub use channel::{ChannelKind, ChannelStore};
pub use device::{
    BatteryGate, Endpoint, HardwareType, Node, NodeFamily, UpdatePolicy, UpdateTarget,
    CANARY_BATTERY_THRESHOLD, STANDARD_BATTERY_THRESHOLD,
};
pub use engine::FleetEngine;
pub use error::{FleetError, UpdateError};
pub use registry::Registry;
pub use view::{EndpointSummary, EndpointView, NodeView};
