//! repolist CLI - list the repositories of a container registry

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use commands::{ConfigArgs, CredentialArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "repolist")]
#[command(version)]
#[command(about = "List the repositories of a container registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the repositories matching a filter
    List {
        /// Registry address (host[:port], optionally with http:// or https://)
        registry: String,

        /// Regular expression matched against whole repository names
        #[arg(short, long, default_value = ".*")]
        filter: String,

        /// Print a JSON array instead of one name per line
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        credentials: CredentialArgs,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Check that the registry's listing API accepts the credentials
    Ping {
        /// Registry address (host[:port], optionally with http:// or https://)
        registry: String,

        #[command(flatten)]
        credentials: CredentialArgs,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    match cli.command {
        Commands::List {
            registry,
            filter,
            json,
            credentials,
            config,
        } => commands::list::run(&registry, &filter, &credentials, &config, json).await,

        Commands::Ping {
            registry,
            credentials,
            config,
        } => commands::ping::run(&registry, &credentials, &config).await,
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::internal(format!("Could not start runtime: {}", e)))
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
