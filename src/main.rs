use std::net::SocketAddr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use easel::application::{ServerConfig, serve};
use easel::infrastructure::synthesis::HF_INFERENCE_URL;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "easel", version, about = "AI image generation service with a persistent gallery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),
}

#[derive(Debug, Args)]
struct ServeCommand {
    /// Address to bind the HTTP server to
    #[arg(long, env = "EASEL_BIND_ADDRESS", default_value = "127.0.0.1:8080")]
    bind_address: SocketAddr,

    /// SQLite database URL backing the gallery store
    #[arg(long, env = "EASEL_DATABASE_URL", default_value = "sqlite:easel.db?mode=rwc")]
    database_url: String,

    /// Base URL of the inference API the orchestrator dispatches to
    #[arg(long, env = "EASEL_INFERENCE_URL", default_value = HF_INFERENCE_URL)]
    inference_url: String,

    /// Fallback API key used when a request carries no credential
    #[arg(long, env = "HUGGINGFACE_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// Override the candidate model list (comma-separated, priority order)
    #[arg(long = "model", env = "EASEL_MODELS", value_delimiter = ',')]
    models: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => {
            let config = ServerConfig {
                bind_address: cmd.bind_address,
                database_url: cmd.database_url,
                inference_url: cmd.inference_url,
                api_key: cmd.api_key,
                models: cmd.models,
            };
            serve(config).await
        }
    }
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
