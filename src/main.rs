use anyhow::Result;
use clap::{Parser, Subcommand};
use srcd_engine::CallContext;
use srcd_engine::cli::{ComponentsCommand, Engine, components};
use srcd_engine::infra::config::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "srcd", about = "Manage the source{d} components on this machine")]
struct Cli {
    /// Config file (default: ~/.srcd/config.yml)
    #[arg(long, env = "SRCD_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, install and inspect components
    Components(ComponentsCommand),
    /// Stop (remove) every running component container
    Stop,
    /// Remove containers, volumes and network, optionally images too
    Prune {
        /// Also remove every installed component image
        #[arg(long)]
        with_images: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = Engine::new(&cli.config)?;
    let ctx = CallContext::background();

    match cli.command {
        Commands::Components(cmd) => components::run(cmd, &engine, &ctx),
        Commands::Stop => engine.stop().map(|_| ExitCode::SUCCESS),
        Commands::Prune { with_images } => {
            engine.prune(&ctx, with_images).map(|_| ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
