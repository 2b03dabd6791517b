//! GitForge CLI - runs the MCP server and manages configuration.

use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use gitforge_api::ApiClient;
use gitforge_core::{Config, ForgeApi};
use gitforge_mcp::{McpServer, Transport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitforge")]
#[command(author, version, about = "Expose a forge's issue tracker as MCP tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over stdio
    Serve {
        /// Forge instance base URL
        #[arg(long, env = "GITFORGE_URL")]
        url: Option<String>,

        /// API access token
        #[arg(long, env = "GITFORGE_TOKEN")]
        token: Option<String>,

        /// Default repository owner
        #[arg(long, env = "GITFORGE_OWNER")]
        owner: Option<String>,

        /// Default repository name
        #[arg(long, env = "GITFORGE_REPO")]
        repo: Option<String>,
    },

    /// Manage stored configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value (url, token, owner, repo)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Stdout carries the protocol; logs go to stderr.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve {
            url,
            token,
            owner,
            repo,
        } => {
            let config = Config::load()?;

            let Some(url) = url.or(config.url) else {
                bail!("--url or GITFORGE_URL is required");
            };
            let Some(token) = token.or(config.token) else {
                bail!("--token or GITFORGE_TOKEN is required");
            };
            let owner = owner.or(config.owner);
            let repo = repo.or(config.repo);

            let client: Arc<dyn ForgeApi> = Arc::new(ApiClient::new(url, token));
            let mut server = McpServer::new(client, owner, repo, Transport::stdio());
            server.run().await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = Config::load()?;
                println!("url   = {}", config.url.as_deref().unwrap_or("(unset)"));
                println!(
                    "token = {}",
                    if config.token.is_some() {
                        "(set)"
                    } else {
                        "(unset)"
                    }
                );
                println!("owner = {}", config.owner.as_deref().unwrap_or("(unset)"));
                println!("repo  = {}", config.repo.as_deref().unwrap_or("(unset)"));
            }
            ConfigCommands::Set { key, value } => {
                let mut config = Config::load()?;
                config.set(&key, &value)?;
                config.save()?;
                tracing::info!(key = %key, "config updated");
            }
        },
    }

    Ok(())
}
