mod config;
mod engine;
mod errors;
mod extract;
mod generation;
mod ingest;
mod llm_client;
mod matching;
mod models;
mod routes;
mod scoring;
mod state;
mod taxonomy;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::engine::AnalysisEngine;
use crate::generation::suggestions::SuggestionGenerator;
use crate::llm_client::build_generator;
use crate::matching::embedder::HttpEmbedder;
use crate::matching::evidence::RetrieverSettings;
use crate::routes::build_router;
use crate::scoring::{MatchScorer, ScoreWeights};
use crate::state::AppState;
use crate::taxonomy::SkillsTaxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Target names use the crate name with underscores.
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FitMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Load the skills taxonomy once; shared read-only across all analyses.
    let taxonomy = Arc::new(if config.taxonomy_path.is_empty() {
        SkillsTaxonomy::builtin()
    } else {
        SkillsTaxonomy::load(Path::new(&config.taxonomy_path))?
    });
    info!(
        "Skills taxonomy loaded ({} categories)",
        taxonomy.categories().count()
    );

    // Embedding oracle
    let embedder = Arc::new(HttpEmbedder::new(
        config.embedding_endpoint.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
    ));
    info!(
        "Embedding client initialized (model: {})",
        config.embedding_model
    );

    // Text-generation oracle (closed backend set, selected by config)
    let generator = build_generator(&config)?;
    info!(
        "Generation client initialized (backend: {})",
        generator.backend_name()
    );

    // Configuration invariants are validated here, once, before serving.
    let retriever_settings =
        RetrieverSettings::new(config.tau_high, config.tau_low, config.top_k)?;
    let scorer = MatchScorer::new(ScoreWeights {
        coverage: config.coverage_weight,
        explicitness: config.explicitness_weight,
        role_alignment: config.role_alignment_weight,
        keywords: config.keywords_weight,
        writing_quality: config.writing_quality_weight,
    })?;

    let suggestions = SuggestionGenerator::new(generator, config.generation_temperature);

    let engine = Arc::new(AnalysisEngine::new(
        taxonomy,
        embedder,
        retriever_settings,
        scorer,
        suggestions,
    ));

    let state = AppState { engine };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
