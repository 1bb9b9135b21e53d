//! Augury CLI - Main entry point for CLI binary
//!
//! This binary provides the `augury` CLI tool for inspecting a fleet and
//! serving the update API.

use anyhow::{bail, Context};
use augury_lib::engine::{
    api::{create_router, ApiState},
    cli::{formatter::CliFormatter, Cli, Commands, OutputFormat},
    config::{Config, CONFIG_FILE},
    fleet::FleetEngine,
};
use clap::Parser;
use std::path::Path;
use tracing::info;

fn main() {
    let cli = Cli::parse();
    augury_lib::init_tracing(&cli.log_level);

    if let Err(e) = run_cli(cli) {
        CliFormatter::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let project_dir = cli.get_project_dir();
    let json_output = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Init { force } => cmd_init(&project_dir, force, json_output),
        Commands::Serve { port, host } => cmd_serve(&project_dir, host, port),
        Commands::Fleet => cmd_fleet(&project_dir, json_output),
        Commands::Node { uuid } => cmd_node(&project_dir, &uuid, json_output),
        Commands::Endpoint { serial } => cmd_endpoint(&project_dir, &serial, json_output),
        Commands::Demo { node, artifact } => cmd_demo(&project_dir, &node, &artifact, json_output),
    }
}

fn load_fleet(project_dir: &Path) -> anyhow::Result<(Config, FleetEngine)> {
    let config = Config::load_or_default(project_dir)
        .with_context(|| format!("loading {}", project_dir.join(CONFIG_FILE).display()))?;
    let fleet = FleetEngine::new(&config.fleet).context("building fleet from config")?;
    Ok((config, fleet))
}

fn cmd_init(project_dir: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    std::fs::create_dir_all(project_dir)?;
    let config = Config::default();
    config.save(project_dir)?;

    if json {
        println!("{}", serde_json::json!({
            "success": true,
            "config": config_path.display().to_string(),
            "nodes": config.fleet.nodes.len(),
        }));
    } else {
        CliFormatter::success(&format!("Wrote {}", config_path.display()));
        CliFormatter::kv("Nodes", &config.fleet.nodes.len().to_string());
    }

    Ok(())
}

#[tokio::main]
async fn cmd_serve(
    project_dir: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (config, fleet) = load_fleet(project_dir)?;
    let host = host.unwrap_or(config.api.host);
    let port = port.unwrap_or(config.api.port);

    let state = ApiState::new(fleet);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    CliFormatter::header("Augury API Server");
    CliFormatter::kv("Nodes", &config.fleet.nodes.len().to_string());
    CliFormatter::kv("Listening", &format!("http://{}", addr));
    CliFormatter::info("Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "api server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

fn cmd_fleet(project_dir: &Path, json: bool) -> anyhow::Result<()> {
    let (_, fleet) = load_fleet(project_dir)?;
    let views = fleet.node_views();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    CliFormatter::header("Fleet");
    CliFormatter::table_header(&["Node", "Version", "Endpoints", "API host"]);
    for view in &views {
        let endpoint_count = view.endpoints.len().to_string();
        CliFormatter::table_row(&[
            view.uuid.as_str(),
            view.version.as_str(),
            endpoint_count.as_str(),
            view.api_host.as_str(),
        ]);
    }
    Ok(())
}

fn cmd_node(project_dir: &Path, uuid: &str, json: bool) -> anyhow::Result<()> {
    let (_, fleet) = load_fleet(project_dir)?;
    let view = fleet.node_view(uuid)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        CliFormatter::node(&view);
    }
    Ok(())
}

fn cmd_endpoint(project_dir: &Path, serial: &str, json: bool) -> anyhow::Result<()> {
    let (_, fleet) = load_fleet(project_dir)?;
    let view = fleet.endpoint_view(serial)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        CliFormatter::endpoint(&view);
    }
    Ok(())
}

fn cmd_demo(project_dir: &Path, uuid: &str, artifact: &str, json: bool) -> anyhow::Result<()> {
    let (_, mut fleet) = load_fleet(project_dir)?;

    let before = fleet.node_view(uuid)?;
    fleet.post_ota(&before.ota_channel, artifact);
    let updated = fleet.poll_node(uuid)?;
    let after = fleet.node_view(uuid)?;

    if json {
        println!("{}", serde_json::json!({
            "before": before,
            "artifact": artifact,
            "updated": updated,
            "after": after,
        }));
        return Ok(());
    }

    CliFormatter::header("Before");
    CliFormatter::kv("Version", &before.version);
    CliFormatter::kv("API host", &before.api_host);
    CliFormatter::divider();
    CliFormatter::kv("Posted", &format!("{} -> {}", artifact, before.ota_channel));
    if updated {
        CliFormatter::success("Updated: true");
    } else {
        CliFormatter::warning("Updated: false");
    }
    CliFormatter::node(&after);
    Ok(())
}
