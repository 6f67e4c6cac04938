use exa_agent::cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "exa-agent", version, about = "Exa neural search capabilities for agent workspaces")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP gateway
    Start,
    /// List the available capabilities
    List {
        /// Print JSON including argument schemas
        #[arg(long)]
        json: bool,
    },
    /// Run one capability and print its output
    Call {
        /// Capability name (e.g. search, getContents)
        name: String,
        /// Workspace the call runs in
        #[arg(short, long)]
        workspace: Option<u64>,
        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
    /// Store an Exa API key for a workspace
    SetKey {
        /// Workspace identifier
        #[arg(short, long)]
        workspace: u64,
        /// The Exa API key
        key: String,
    },
    /// Check whether the gateway is running
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; everything also comes from the real environment.
    let _ = dotenvy::dotenv();

    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| exa_agent::agent_home().join("config.yaml"));

    match cli.command.unwrap_or(Command::Start) {
        Command::Start => cli::serve(&config_path).await,
        Command::List { json } => cli::print_capabilities(json),
        Command::Call {
            name,
            workspace,
            args,
        } => {
            let output =
                cli::call_capability(&config_path, &name, workspace, args.as_deref()).await?;
            println!("{output}");
            Ok(())
        }
        Command::SetKey { workspace, key } => cli::set_key(&config_path, workspace, &key).await,
        Command::Status => cli::check_status(&config_path).await,
    }
}
