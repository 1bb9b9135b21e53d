// Augury Engine - Core module structure
pub mod config;
pub mod fleet;
pub mod api;
pub mod cli;
pub mod observability;

pub use config::Config;
pub use fleet::FleetEngine;
