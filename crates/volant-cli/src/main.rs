use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use volant_cli::auth::{LoginArgs, RegisterArgs};
use volant_cli::nodes::NodesArgs;
use volant_cli::vpn::ConnectArgs;

/// Volant VPN command-line client.
#[derive(Debug, Parser)]
#[command(name = "volant", version, about)]
struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = "VOLANT_API_URL")]
    api_url: Option<String>,

    /// Run without interactive prompts (use flags and environment variables)
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in to the backend and save the session
    Login(LoginArgs),
    /// Create an account and save the session
    Register(RegisterArgs),
    /// Forget the saved session
    Logout,
    /// Show the logged-in user's profile and usage
    Whoami,
    /// List available exit nodes
    Nodes(NodesArgs),
    /// Bring the tunnel up to a node
    Connect(ConnectArgs),
    /// Take the tunnel down
    Disconnect,
    /// Show tunnel liveness and transfer counters
    Status,
    /// List this account's sessions
    Sessions,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Login(args) => volant_cli::auth::login(args, api_url, cli.non_interactive)?,
        Commands::Register(args) => {
            volant_cli::auth::register(args, api_url, cli.non_interactive)?;
        }
        Commands::Logout => volant_cli::auth::logout()?,
        Commands::Whoami => volant_cli::auth::whoami(api_url)?,
        Commands::Nodes(ref args) => volant_cli::nodes::run(args, api_url)?,
        Commands::Connect(ref args) => volant_cli::vpn::connect(args, api_url)?,
        Commands::Disconnect => volant_cli::vpn::disconnect()?,
        Commands::Status => volant_cli::vpn::status()?,
        Commands::Sessions => volant_cli::vpn::sessions(api_url)?,
    }

    Ok(())
}
