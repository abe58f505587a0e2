//! Front router demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server (axum catch-all, request id, timeout, trace)
//!                        │
//!                        ▼
//!                    kernel (booted once: config, store, frozen router)
//!                        │
//!                        ▼
//!                    routing::dispatch (strip base path, match, call handler)
//!                        │            └── on failure: error route / default
//!                        ▼
//!     Client Response ◀── http::response (status, raw headers, body)
//! ```
//!
//! Besides `serve`, the binary can list the registered routes, build a URL
//! from a route name, or dispatch a single path and print the raw response.

mod site;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use front_router::config::{load_config, AppConfig};
use front_router::observability::{logging, metrics};
use front_router::{HttpServer, Kernel};

#[derive(Parser)]
#[command(name = "front-router")]
#[command(about = "Front controller router demo", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve HTTP until Ctrl+C (default)
    Serve,
    /// List registered routes in match order
    Routes,
    /// Print the absolute URL of a named route
    Url {
        name: String,
        args: Vec<String>,
    },
    /// Dispatch one path and print the raw HTTP response
    Resolve { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init_logging(&config.observability)?;

    tracing::info!(
        config = ?cli.config,
        developer_mode = config.app.developer_mode,
        base_dir = %config.app.base_dir,
        "front-router v0.1.0 starting"
    );

    let kernel = Kernel::boot(config, &site::Site)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(kernel).await?,
        Command::Routes => {
            let mut out = std::io::stdout().lock();
            for route in kernel.router().routes().iter() {
                writeln!(out, "{:<12} {}", route.name(), route.pattern())?;
            }
        }
        Command::Url { name, args } => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            println!("{}", kernel.router().absolute_url(&name, &args)?);
        }
        Command::Resolve { path } => {
            let dispatch = kernel.handle(&kernel.descriptor(&path))?;
            tracing::info!(
                route = ?dispatch.active_route(),
                error = ?dispatch.active_error(),
                "Resolved"
            );
            dispatch
                .into_response()
                .send(&mut std::io::stdout().lock())?;
            kernel.shutdown()?;
        }
    }

    Ok(())
}

async fn serve(kernel: Kernel) -> Result<(), Box<dyn std::error::Error>> {
    let observability = &kernel.config().observability;
    if observability.metrics_enabled {
        match observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&kernel.config().listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = kernel.config().timeouts.request_secs,
        "Listening for connections"
    );

    HttpServer::new(Arc::new(kernel)).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
