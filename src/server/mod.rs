//! JSON HTTP surface over the tracker.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error::Result;
use crate::fetcher::PageFetcher;

pub use error::AppError;
pub use state::AppState;

/// Build the application router.
pub fn router<F: PageFetcher>(state: Arc<AppState<F>>) -> Router {
    Router::new()
        .route("/", get(routes::list_records::<F>))
        .route("/refresh", get(routes::refresh::<F>))
        .route("/record/{id}", get(routes::get_record::<F>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router on `bind` until Ctrl-C.
pub async fn serve<F: PageFetcher>(state: Arc<AppState<F>>, bind: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;
    Ok(())
}
