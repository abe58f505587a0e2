//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all front controller
//! - Wire up middleware (request ID, timeout, tracing)
//! - Hand every request to the kernel on a blocking task
//! - Turn dispatch aborts into a bare 500

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::kernel::Kernel;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub kernel: Arc<Kernel>,
}

/// HTTP front controller for a booted kernel.
pub struct HttpServer {
    router: Router,
    kernel: Arc<Kernel>,
}

impl HttpServer {
    pub fn new(kernel: Arc<Kernel>) -> Self {
        let router = Self::build_router(&kernel);
        Self { router, kernel }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(kernel: &Arc<Kernel>) -> Router {
        let request_timeout = Duration::from_secs(kernel.config().timeouts.request_secs);
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        let state = AppState {
            kernel: kernel.clone(),
        };

        Router::new()
            .route("/{*path}", any(front_controller))
            .route("/", any(front_controller))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id))
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `signal` completes, then flush the kernel.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        self.kernel.shutdown()?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }
}

/// Every path lands here, as a rewrite rule would send it to the front controller.
async fn front_controller(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %path,
        "Front controller request"
    );

    let kernel = state.kernel.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let descriptor = kernel.descriptor(&path);
        kernel.handle(&descriptor)
    })
    .await;

    match outcome {
        Ok(Ok(dispatch)) => {
            tracing::debug!(
                request_id = %request_id,
                route = ?dispatch.active_route(),
                error = ?dispatch.active_error(),
                status = dispatch.response().status(),
                "Request dispatched"
            );
            dispatch.into_response().into_response()
        }
        Ok(Err(abort)) => {
            tracing::error!(request_id = %request_id, error = %abort, "Dispatch aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Handler task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
