use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use documind_core::Config;
use documind_ingest::embedding::MINILM_DIMENSIONS;
use documind_ingest::{Embedder, HashingEmbedder, LocalEmbedder};
use documind_llm::AnswerGenerator;
use documind_server::{build_router, AppState};

/// DocuMind: upload documents, ask questions about them.
#[derive(Parser, Debug)]
#[command(name = "documind-server", version, about)]
struct Cli {
    /// Bind address (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Config profile; keys are looked up as `{PROFILE}_{KEY}` first.
    #[arg(long, env = "DOCUMIND_PROFILE")]
    profile: Option<String>,
}

fn load_config(cli: &Cli) -> Config {
    documind_core::config::load_dotenv();
    let mut config = match &cli.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config
}

async fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    match config.embedding.provider.as_str() {
        "hash" => {
            info!("Using feature-hashing embedder ({} dims)", config.embedding.dimensions);
            Ok(Arc::new(HashingEmbedder::new(config.embedding.dimensions)))
        }
        _ => {
            anyhow::ensure!(
                config.embedding.dimensions == MINILM_DIMENSIONS,
                "EMBEDDING_DIMENSIONS={} but the local model produces {}-d vectors",
                config.embedding.dimensions,
                MINILM_DIMENSIONS
            );
            let cache_dir = config.embedding.model_cache_dir.clone();
            let embedder = tokio::task::spawn_blocking(move || LocalEmbedder::new(cache_dir))
                .await
                .context("embedding model loader panicked")??;
            Ok(Arc::new(embedder))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    config.validate()?;
    config.log_summary();

    let embedder = build_embedder(&config).await?;
    let generator = AnswerGenerator::from_config(&config.llm)?;
    info!("LLM provider: {} ({})", generator.provider_name(), config.llm.model_label());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, embedder, generator)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
