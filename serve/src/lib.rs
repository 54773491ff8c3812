//! HTTP endpoint for weft (axum).
//!
//! Listens on http://127.0.0.1:5000 and answers `POST /generate` with one chat completion.
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`], [`router`], [`init_logging`].

mod app;
mod response;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;
use weft::LlmClient;

pub use app::{router, AppState};
pub use response::{ErrorBody, GenerateRequest, GenerateResponse};

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Serves on an existing listener until `shutdown` fires (or forever when `None`).
/// Tests bind `127.0.0.1:0` and pass the listener in.
pub async fn run_serve_on_listener(
    listener: TcpListener,
    llm: Arc<dyn LlmClient>,
    shutdown: Option<oneshot::Receiver<()>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("HTTP server listening on http://{}", addr);

    let app = router(Arc::new(AppState { llm }));
    match shutdown {
        Some(rx) => {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await?;
            info!("shutdown signal received, server stopped");
        }
        None => axum::serve(listener, app).await?,
    }
    Ok(())
}

/// Binds `addr` (default [`DEFAULT_ADDR`]) and serves forever.
pub async fn run_serve(
    addr: Option<&str>,
    llm: Arc<dyn LlmClient>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr.unwrap_or(DEFAULT_ADDR)).await?;
    run_serve_on_listener(listener, llm, None).await
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`). Safe to call more than once.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
