//! Scholar Tool Server
//!
//! Axum-based server speaking MCP streamable HTTP on `/mcp`.
//!
//! Serves the `search_google_scholar` tool. Set `SCHOLAR_BACKEND=static` to
//! answer from a built-in corpus instead of the live site.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{Router, routing::get};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LocalToolProvider;
use scholar_search::{HttpScholarBackend, SearchBackend, StaticBackend, tools::ScholarSearchTool};

use crate::handlers::{ScholarToolServer, health_check};
use crate::state::AppState;

fn build_router(state: AppState, shutdown: &CancellationToken) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let tools = Arc::clone(&state.tools);
    let mcp: StreamableHttpService<ScholarToolServer, LocalSessionManager> = StreamableHttpService::new(
        move || Ok(ScholarToolServer::new(Arc::clone(&tools))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: true,
            cancellation_token: shutdown.child_token(),
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health_check))
        .nest_service("/mcp", mcp)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn search_backend() -> anyhow::Result<Arc<dyn SearchBackend>> {
    match std::env::var("SCHOLAR_BACKEND").as_deref() {
        Ok("static") => {
            tracing::warn!("⚠ Using the built-in static corpus - results are not live");
            Ok(Arc::new(StaticBackend::sample()))
        }
        _ => Ok(Arc::new(HttpScholarBackend::new()?)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let backend = search_backend()?;

    let mut tools = LocalToolProvider::new();
    tools.register(ScholarSearchTool::new(backend));

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let shutdown = CancellationToken::new();
    let app = build_router(AppState::new(tools), &shutdown);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 Scholar tool server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health - Health check");
    tracing::info!("  POST   /mcp    - MCP requests (initialize, tools/list, tools/call)");
    tracing::info!("  GET    /mcp    - Server event stream");
    tracing::info!("  DELETE /mcp    - End session");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
