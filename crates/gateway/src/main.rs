//! PaperGraph API Gateway
//!
//! The entry point for all external API requests. Handles:
//! - Paper network discovery and collaborator suggestions
//! - Flowchart generation from paper content
//! - Observability (logging, metrics, tracing)

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use papergraph_common::{
    arxiv::ArxivClient,
    cache::MemoryCache,
    config::{AppConfig, ObservabilityConfig},
    db::{Db, Repository},
    metrics,
    retry::RetryPolicy,
};
use papergraph_discovery::{GraphBuilder, PaperRepository, RelatedPaperFinder, SimilarityEngine};
use papergraph_outline::OutlineClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Db,
    pub papers: Arc<PaperRepository>,
    pub graph: Arc<GraphBuilder>,
    pub similarity: Arc<SimilarityEngine>,
    pub outline: Arc<OutlineClient>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing
    init_tracing(&config.observability);
    info!("Starting PaperGraph gateway v{}", papergraph_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        metrics::init_prometheus(config.observability.metrics_port)?;
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = Db::connect(&config.database).await?;
    db.ensure_schema().await?;

    let retry = RetryPolicy::new(config.retry.max_attempts, config.retry.initial_delay());

    // Cache tiers; each sweeper holds a weak reference and dies with its cache
    let response_cache = Arc::new(MemoryCache::new(config.cache.metadata_ttl()));
    response_cache.spawn_sweeper(config.cache.metadata_sweep());
    let paper_cache = Arc::new(MemoryCache::new(config.cache.metadata_ttl()));
    paper_cache.spawn_sweeper(config.cache.metadata_sweep());
    let related_cache = Arc::new(MemoryCache::new(config.cache.metadata_ttl()));
    related_cache.spawn_sweeper(config.cache.metadata_sweep());
    let flowchart_cache = Arc::new(MemoryCache::new(config.cache.derived_ttl()));
    flowchart_cache.spawn_sweeper(config.cache.derived_sweep());

    // Construct the service graph; every dependency is injected explicitly
    let source = Arc::new(ArxivClient::new(&config.arxiv, retry.clone(), response_cache)?);
    let store = Arc::new(Repository::new(db.clone()));
    let papers = Arc::new(PaperRepository::new(store, source.clone(), paper_cache));
    let related = Arc::new(RelatedPaperFinder::new(source, related_cache));
    let graph = Arc::new(GraphBuilder::new(
        papers.clone(),
        related,
        config.discovery.max_in_flight,
    ));
    let similarity = Arc::new(SimilarityEngine::new());
    let outline = Arc::new(OutlineClient::new(
        config.outline.clone(),
        retry,
        flowchart_cache,
    )?);

    let state = AppState {
        config: config.clone(),
        db,
        papers,
        graph,
        similarity,
        outline,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        .route("/papers/{id}", get(handlers::network::get_paper_network))
        .route("/flowchart", post(handlers::flowchart::generate_flowchart));

    // Compose the app
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
