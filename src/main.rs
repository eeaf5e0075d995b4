use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lb_hosts_manager::config::{DEFAULT_HOSTS_FILE, DEFAULT_MARKER};
use lb_hosts_manager::{Manager, ManagerConfig};

/// Sync a Kubernetes cluster's load balancer addresses into a hosts file
#[derive(Debug, Parser)]
#[command(name = "lb-hosts-manager", version, subcommand_required = true)]
struct Cli {
    /// Logging verbosity level
    #[arg(
        long,
        env = "LB_HOSTS_MANAGER_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    const fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the manager
    Run(RunArgs),
    /// Print the tool version
    Version,
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Kubeconfig to use (in-cluster / default inference when unset)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Seconds between reconciliations (0 means 1)
    #[arg(long, default_value_t = 1)]
    interval: u64,

    /// Hosts file to manage
    #[arg(long, default_value = DEFAULT_HOSTS_FILE)]
    hosts_file: PathBuf,

    /// Marker token identifying managed lines
    #[arg(long, default_value = DEFAULT_MARKER, hide = true)]
    marker: String,

    /// Log failed ticks and keep running instead of exiting
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    ignore_errors: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(err) = run(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command) -> lb_hosts_manager::Result<()> {
    match command {
        Command::Version => {
            print!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Run(args) => {
            let config = ManagerConfig::new()
                .with_kubeconfig(args.kubeconfig)
                .with_hosts_file(args.hosts_file)
                .with_marker(args.marker)
                .with_interval(Duration::from_secs(args.interval))
                .with_ignore_errors(args.ignore_errors);

            Manager::new(config)?.run_until_signal().await
        }
    }
}
