//! `hexarc` - CLI for deploying hexarc services
//!
//! This binary deploys the bundled sample service and provides
//! configuration inspection commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use hexarc::{init_logging, Config, DeploymentConfig, DeploymentGroup};
use hexarc_cli::cli::{Cli, Command, ConfigCommand, RunCommand};
use hexarc_cli::lamp;
use hexarc_http::BOUND_ADDRESS;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Run(run_cmd) => handle_run(&config, &run_cmd).await,
        Command::Describe(describe_cmd) => handle_describe(describe_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_run(config: &Config, cmd: &RunCommand) -> Result<()> {
    let bind: SocketAddr = match &cmd.bind {
        Some(addr) => addr.parse()?,
        None => config.http_bind_addr()?,
    };

    let mut group = DeploymentGroup::with_config(DeploymentConfig::from(config));
    let mut bound = group.bus().subscribe(BOUND_ADDRESS);

    info!("Deploying {} service", lamp::SERVICE_NAME);
    group.deploy(lamp::lamp_service(bind)?).await?;

    let announcement = bound.recv().await?;
    let addr = announcement.payload()["addr"]
        .as_str()
        .unwrap_or("<unknown>")
        .to_string();
    println!("{} service listening on http://{addr}", lamp::SERVICE_NAME);
    println!("Press Ctrl-C to undeploy.");

    tokio::signal::ctrl_c().await?;
    println!();
    info!("Shutting down deployment group");
    group.shutdown().await?;
    println!("All services undeployed.");
    Ok(())
}

fn handle_describe(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&lamp::describe())?);
    } else {
        let service = lamp::lamp_service("127.0.0.1:0".parse()?)?;
        println!("Sample service: {}", service.name());
        println!("  Ports:    {}", service.port_names().join(", "));
        println!("  Adapters: {}", service.adapter_count());
        println!();
        println!("Routes served by the http adapter:");
        println!("  GET  /lamp");
        println!("  POST /lamp/on");
        println!("  POST /lamp/off");
        println!("  POST /lamp/toggle");
        println!("  GET  /healthz");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Deployment]");
                println!(
                    "  Ready timeout (ms): {}",
                    config.deployment.ready_timeout_ms
                );
                println!("  Stop timeout (ms):  {}", config.deployment.stop_timeout_ms);
                println!("  Bus capacity:       {}", config.deployment.bus_capacity);
                println!();
                println!("[Store]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Http]");
                println!("  Bind address:       {}", config.http.bind_addr);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
