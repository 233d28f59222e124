mod commands;
mod registry;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cloudspan_driver::{ResourceKind, WaitConfig};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cloudspan")]
#[command(about = "One resource model across clouds", long_about = None)]
#[command(version)]
struct Cli {
    /// Connection profile to use
    #[arg(short, long, global = true, env = "CLOUDSPAN_PROFILE", default_value = "default")]
    profile: String,

    /// Log provider calls (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered drivers and their capabilities
    Drivers,
    /// List connection profiles
    Profiles,
    /// List resources of one kind
    List {
        /// vm, image, public-ip, security, vnetwork, vnic, key-pair
        kind: ResourceKind,
    },
    /// Show one resource
    Get { kind: ResourceKind, id: String },
    /// Create a resource from a YAML or JSON request file
    Create {
        kind: ResourceKind,
        request: PathBuf,
    },
    /// Delete a resource
    Delete { kind: ResourceKind, id: String },
    /// VM lifecycle
    #[command(subcommand)]
    Vm(VmCommands),
}

#[derive(Subcommand)]
pub enum VmCommands {
    /// Create and boot a VM from a request file
    Start { request: PathBuf },
    Suspend { id: String },
    Resume { id: String },
    Reboot { id: String },
    /// Delete a VM
    Terminate { id: String },
    /// Status of one VM, or of every VM when no id is given
    Status { id: Option<String> },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Drivers => {
            return commands::drivers::handle(&registry::build(WaitConfig::default()));
        }
        Commands::Profiles => {
            commands::profiles::handle(&cloudspan_config::load_profiles()?);
            return Ok(());
        }
        _ => {}
    }

    let loaded = cloudspan_config::load_profiles()?;
    tracing::debug!("Using profiles from {}", loaded.path.display());
    let profile = loaded.file.profile(&cli.profile)?;
    let registry = registry::build(profile.wait_config());
    let conn = commands::connect(&registry, &cli.profile, profile).await?;
    let conn = conn.as_ref();

    let result = match &cli.command {
        Commands::List { kind } => commands::resource::list(conn, *kind).await,
        Commands::Get { kind, id } => commands::resource::get(conn, *kind, id).await,
        Commands::Create { kind, request } => {
            commands::resource::create(conn, *kind, request).await
        }
        Commands::Delete { kind, id } => commands::resource::delete(conn, *kind, id).await,
        Commands::Vm(command) => commands::vm::handle(conn, command).await,
        Commands::Drivers | Commands::Profiles => Ok(()),
    };
    result.with_context(|| format!("Profile '{}' ({})", cli.profile, profile.driver))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
