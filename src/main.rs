// ABOUTME: Entry point for the stackup CLI application.
// ABOUTME: Parses arguments and drives the orchestration state machine.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use stackup::config::{self, Config};
use stackup::error::Result;
use stackup::orchestrator::{self, Orchestration};
use stackup::process::TokioRunner;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, force)
        }
        Commands::Up => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            up(config, cwd).await
        }
        Commands::Down => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            down(config).await
        }
    }
}

/// Drive the full orchestration to `ApplicationsRunning` and supervise it.
async fn up(config: Config, root: PathBuf) -> Result<()> {
    let runner = Arc::new(TokioRunner);

    println!("Starting {} stack", config.project);

    println!("  → Checking requirements...");
    let orch = Orchestration::new(config, root).check_requirements()?;

    println!("  → Provisioning TLS certificate...");
    let orch = orch.provision_certificate()?;

    println!("  → Writing configuration artifacts...");
    let orch = orch.write_artifacts()?;

    println!("  → Starting infrastructure...");
    let orch = orch.start_infrastructure(&runner).await?;

    println!("  → Waiting for services to become reachable...");
    let orch = match orch.await_healthy().await {
        Ok(orch) => orch,
        Err((failed, e)) => {
            eprintln!("  ✗ Infrastructure failed: {e}");
            println!("  → Rolling back...");
            failed.rollback(runner.as_ref()).await;
            return Err(e.into());
        }
    };
    println!("  ✓ Infrastructure ready");

    println!("  → Starting applications...");
    let orch = orch.start_applications(&runner);

    match orch.supervise().await {
        Ok(()) => {
            println!("  ✓ All services exited cleanly");
            Ok(())
        }
        Err((failed, e)) => {
            eprintln!("  ✗ {e}");
            println!("  → Rolling back...");
            failed.rollback(runner.as_ref()).await;
            Err(e.into())
        }
    }
}

/// Best-effort shutdown of all configured infrastructure containers.
async fn down(config: Config) -> Result<()> {
    let runner = TokioRunner;
    let names = config.infra_container_names();

    println!("  → Stopping infrastructure containers...");
    orchestrator::shutdown_infrastructure(&runner, &names).await;
    println!("  ✓ Done");
    Ok(())
}
