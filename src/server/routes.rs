use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;

use crate::fetcher::PageFetcher;
use crate::models::{LatestPrice, ParsedRecord, PriceHistory};
use crate::page;
use crate::server::error::AppError;
use crate::server::state::AppState;

/// GET /
///
/// Latest price of every tracked record.
pub async fn list_records<F: PageFetcher>(
    State(state): State<Arc<AppState<F>>>,
) -> Result<Json<Vec<LatestPrice>>, AppError> {
    let latest = state.tracker.latest().await?;
    Ok(Json(latest))
}

/// GET /refresh
///
/// Re-scrape every URL in the input list, persist today's prices and return
/// what was scraped.
pub async fn refresh<F: PageFetcher>(
    State(state): State<Arc<AppState<F>>>,
) -> Result<Json<Vec<ParsedRecord>>, AppError> {
    let urls = page::read_url_list(&state.input)?;
    let scraped = state.tracker.refresh(&state.collector, &urls).await?;
    Ok(Json(scraped))
}

/// GET /record/{id}
///
/// Full price history of one record. Unknown or non-numeric ids are 404s.
pub async fn get_record<F: PageFetcher>(
    State(state): State<Arc<AppState<F>>>,
    Path(id): Path<String>,
) -> Result<Json<PriceHistory>, AppError> {
    let record_id: i64 = id
        .parse()
        .map_err(|_| AppError::not_found(format!("No record with id '{id}'")))?;

    match state.tracker.history(record_id).await? {
        Some(history) => Ok(Json(history)),
        None => Err(AppError::not_found(format!("No record with id '{id}'"))),
    }
}
