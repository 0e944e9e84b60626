use anyhow::Result;
use clap::{Parser, Subcommand};
use houer::cli::{self, ConfigAction, ContainerAction};
use houer::infra::config::default_config_dir;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "houer",
    version,
    about = "Manage distrobox (Linux) and soda (Windows) containers"
)]
struct Cli {
    /// Configuration directory (default: ~/.houer-manager)
    #[arg(long, env = "HOUER_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: PathBuf,

    /// Log backend invocations (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Container(ContainerAction),
    /// Read and change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check that the backend tools are installed
    Doctor,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Container(action) => cli::container::run(action, &cli.config_dir),
        Commands::Config { action } => cli::settings::run(action, &cli.config_dir),
        Commands::Doctor => cli::doctor::run(&cli.config_dir),
    }
}
