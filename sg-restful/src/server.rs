//! Gateway HTTP server
//!
//! [`Server::layered`] wraps the route table in the request pipeline;
//! [`Server::serve`] binds the port and runs until SIGINT or SIGTERM, letting
//! in-flight backend calls finish.

use std::net::SocketAddr;

use axum::{http::StatusCode, Router};
use tokio::{net::TcpListener, signal};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
};

/// Gateway server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wrap `app` in the request pipeline
    ///
    /// The last layer added runs first, so from the outside in a request
    /// passes panic recovery, request id assignment and propagation, header
    /// masking, tracing, the body limit, the timeout, compression and CORS.
    pub fn layered(&self, app: Router) -> Router {
        let trace = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().include_headers(true))
            .on_response(DefaultOnResponse::new().include_headers(true));

        app.layer(cors_layer(&self.config.service.cors_mode))
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes()))
            .layer(trace)
            // outside the trace layer so spans never see credentials
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer())
            .layer(CatchPanicLayer::new())
    }

    /// Bind `0.0.0.0:port` and serve `app` until a shutdown signal arrives
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let service = &self.config.service;
        let backend = &self.config.backend;

        tracing::info!(
            name = %service.name,
            %addr,
            shotgun_host = %backend.host,
            api_path = %backend.api_path,
            "starting gateway"
        );
        tracing::info!(
            body_limit_mb = service.body_limit_mb,
            cors_mode = %service.cors_mode,
            request_timeout_secs = service.timeout_secs,
            backend_timeout_secs = backend.timeout_secs,
            max_cached_connections = backend.max_cached_connections,
            "request pipeline"
        );

        let app = self.layered(app);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

fn cors_layer(mode: &str) -> CorsLayer {
    match mode {
        "permissive" => CorsLayer::permissive(),
        "restrictive" | "disabled" => CorsLayer::new(),
        other => {
            tracing::warn!(mode = other, "unknown CORS mode, using permissive");
            CorsLayer::permissive()
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
///
/// A handler that fails to install never fires; the other one still can.
async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGINT");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    tracing::info!(signal = received, "shutting down, draining in-flight requests");
}
