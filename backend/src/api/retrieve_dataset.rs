//! Single dataset retrieval endpoint.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::search_result::SearchedDataset;

use crate::api::bearer_token;
use crate::error::{DiscoveryError, Result};
use crate::search::aggregator::searched_dataset;
use crate::state::AppState;

pub async fn retrieve_dataset(
    state: &AppState,
    id: &str,
    caller_token: Option<&str>,
) -> Result<SearchedDataset> {
    let fetched = state
        .catalog
        .fetch_by_ids(&[id.to_string()], None, 1, 0, None, caller_token)
        .await
        .map_err(DiscoveryError::Catalog)?;
    let raw = fetched
        .results
        .into_iter()
        .next()
        .ok_or_else(|| DiscoveryError::DatasetNotFound(id.to_string()))?;
    let records_count = raw.records_count;
    Ok(searched_dataset(raw, records_count))
}

pub async fn retrieve_dataset_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SearchedDataset>> {
    let token = bearer_token(&headers);
    let dataset = retrieve_dataset(&state, &id, token.as_deref()).await?;
    Ok(Json(dataset))
}
