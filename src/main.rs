//! procfleet: a terminal UI for inspecting processes across machines

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use procfleet_core::{Target, TargetRegistry};
use procfleet_hosts::{DEFAULT_SSH_PORT, ProcessSource, RemoteHost, SSH_BACKEND, load_remote_config};
use procfleet_tui::App;
use std::fs::File;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// procfleet: process tables for the local machine and remote hosts
#[derive(Parser, Debug)]
#[command(name = "procfleet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the remote hosts file (name:host:port:user:password:type)
    #[arg(short = 'c', long)]
    remote_config: Option<String>,

    /// Add a single remote host by name
    #[arg(short, long)]
    server: Option<String>,

    /// Username for --server
    #[arg(short, long)]
    username: Option<String>,

    /// Password for --server (stored, not used by the ssh backend)
    #[arg(short, long)]
    password: Option<String>,

    /// SSH port for --server
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    port: u16,

    /// Verify the local process listing and exit without starting the UI
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: /tmp/procfleet.log)
    #[arg(long, default_value = "/tmp/procfleet.log")]
    log_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;

    // Log to file, not stdout, which would corrupt the TUI
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let log_file = File::create(&cli.log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(true)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    tracing::info!("Starting procfleet");

    if cli.dry_run {
        let snapshot = ProcessSource::local().fetch().await?;
        println!("Local process listing: OK ({} processes)", snapshot.len());
        return Ok(());
    }

    let mut targets = vec![Target::new("local", ProcessSource::local())];

    if let Some(path) = &cli.remote_config {
        for host in load_remote_config(path)? {
            tracing::info!("Adding remote host {} ({})", host.name, host.destination());
            let label = host.name.clone();
            targets.push(Target::new(label, ProcessSource::remote(host)));
        }
    }

    if let Some(server) = &cli.server {
        let host = RemoteHost {
            name: server.clone(),
            host: server.clone(),
            port: cli.port,
            username: cli.username.clone().unwrap_or_else(whoami),
            password: cli.password.clone().unwrap_or_default(),
            backend: SSH_BACKEND.to_string(),
        };
        tracing::info!("Adding remote host {} ({})", host.name, host.destination());
        targets.push(Target::new(server.clone(), ProcessSource::remote(host)));
    }

    // Populate the local tab before the first frame. A failure here is only
    // fatal when there is nothing else to show.
    match targets[0].source().fetch().await {
        Ok(snapshot) => targets[0].apply_snapshot(snapshot),
        Err(e) if targets.len() == 1 => {
            return Err(eyre!("cannot list local processes: {e}"));
        }
        Err(e) => {
            tracing::warn!("local process listing failed: {e}");
            targets[0].fetch_failed(e.to_string());
        }
    }

    let mut app = App::new(TargetRegistry::new(targets));
    app.run().await?;

    tracing::info!("Goodbye!");
    Ok(())
}

fn whoami() -> String {
    std::env::var("USER").unwrap_or_else(|_| "root".to_string())
}
