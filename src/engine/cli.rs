//! Augury CLI Module
//! Command-line interface for fleet update operations

pub mod formatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "augury")]
#[command(author = "Augury Team")]
#[command(version)]
#[command(about = "Firmware update engine for gateway and sensor fleets", long_about = None)]
pub struct Cli {
    /// Project directory holding augury.config.json (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default augury.config.json
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,
    },

    /// List every node in the configured fleet
    Fleet,

    /// Show a node and its endpoints
    Node {
        /// Node uuid
        uuid: String,
    },

    /// Show an endpoint
    Endpoint {
        /// Endpoint serial number
        serial: String,
    },

    /// Post an OTA artifact to a node and poll it once
    Demo {
        /// Node uuid
        #[arg(long, default_value = "MOXA_TBCDB1045003")]
        node: String,

        /// Artifact to post
        #[arg(long, default_value = "moxa_34.swu")]
        artifact: String,
    },
}

impl Cli {
    pub fn get_project_dir(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
