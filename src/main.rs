mod agent;
mod config;
mod error;
mod instrumentation;
mod llm;
mod server;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use agent::{RenderResult, SearchAgent};
use config::{Config, SecretStore};
use error::StartupError;
use llm::GeminiClient;
use server::{AppState, Startup};

#[derive(Parser)]
#[command(name = "search-agent", about = "Search-grounded question answering over Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Secrets file holding GEMINI_API_KEY
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the question form over HTTP
    Serve {
        /// Address to listen on (defaults to BIND_ADDR)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question to answer
        question: String,

        /// Print the result and request log as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves the credential and configures the client, once per process.
fn bootstrap(config: &Config) -> Result<SearchAgent, StartupError> {
    let secrets = SecretStore::load(&config.secrets_path)?;
    let credential = config::load_credential(&secrets)?;
    let client = GeminiClient::new(&credential, &config.gemini_model, &config.gemini_base_url)?;
    tracing::info!(model = client.model(), "Gemini client configured");
    Ok(SearchAgent::new(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(path) = cli.secrets {
        config.secrets_path = path;
    }

    match cli.command {
        Commands::Serve { bind } => {
            let startup = match bootstrap(&config) {
                Ok(agent) => Startup::Ready(agent),
                Err(err) => {
                    tracing::error!(error = %err, "startup failed; serving error page only");
                    Startup::Halted(err)
                }
            };
            let state = AppState::new(startup).context("Failed to load page template")?;

            let addr = bind.unwrap_or(config.bind_addr);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context(format!("Failed to bind {}", addr))?;
            tracing::info!(%addr, "serving search form");
            axum::serve(listener, server::router(Arc::new(state)))
                .await
                .context("HTTP server failed")?;
        }
        Commands::Ask { question, json } => {
            let agent = bootstrap(&config)?;
            let submission = agent.submit(&question).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&submission)?);
            } else {
                match &submission.result {
                    RenderResult::Success { .. } => {
                        println!("\n{}", ui::markdown::render_markdown(&submission.result));
                    }
                    other => eprintln!("{}", ui::markdown::render_markdown(other)),
                }
                if cli.verbose {
                    println!("{}", submission.log.summary());
                }
            }

            if !matches!(submission.result, RenderResult::Success { .. }) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
