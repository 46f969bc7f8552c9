//! Gateway Server
//!
//! HTTP boundary for connection tests: JSON in, `{status, message}` out,
//! CORS open to browser consoles.

mod dependencies;
pub mod handlers;
pub mod logging_middleware;

pub use dependencies::{DependenciesBuilder, GatewayDependencies};
pub use handlers::AppState;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Value of `Access-Control-Allow-Headers` on every response
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Default port of the gateway
pub const DEFAULT_PORT: u16 = 8787;

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS for browser access
    pub enable_cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
        }
    }
}

/// Answers preflights and sets the origin. `Access-Control-Allow-Headers`
/// is written by an outer layer so every response carries `ALLOWED_HEADERS`
/// verbatim.
fn cors_layer() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods(Any)
}

/// Build the router with all routes and layers
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/test-connection",
            post(handlers::test_connection).options(handlers::test_connection_preflight),
        )
        .route(
            "/connections/{id}/test",
            post(handlers::test_stored_connection),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            logging_middleware::http_logging_middleware,
        ));

    if config.enable_cors {
        router = router
            .layer(SetResponseHeaderLayer::if_not_present(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(cors_layer())
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ));
    }

    router
}

/// Connection test gateway
pub struct GatewayServer {
    config: GatewayConfig,
    dependencies: GatewayDependencies,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, dependencies: GatewayDependencies) -> Self {
        info!("[Gateway] Initializing with dependency injection...");
        Self {
            config,
            dependencies,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router for this server (also used directly by tests)
    pub fn router(&self) -> Router {
        let state = AppState {
            tester: self.dependencies.tester.clone(),
            connections: self.dependencies.connection_repo.clone(),
        };
        build_router(state, &self.config)
    }

    /// Bind the configured address and serve until the process exits
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        info!("[Gateway] Starting on {}", listener.local_addr()?);
        info!(
            "[Gateway] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );

        let router = self.router();
        info!("[Gateway] Ready to accept connections");

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background
    ///
    /// Returns a JoinHandle that can be used to wait for completion or abort.
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
