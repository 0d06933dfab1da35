//! Federated dataset search endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use common::search_query::DatasetSearchQuery;
use common::search_result::DatasetSearchResult;
use tracing::info;

use crate::api::bearer_token;
use crate::error::Result;
use crate::search::aggregator;
use crate::state::AppState;

pub async fn search_datasets(
    state: &AppState,
    query: &DatasetSearchQuery,
    caller_token: Option<&str>,
) -> Result<DatasetSearchResult> {
    aggregator::search_datasets(
        state.catalog.as_ref(),
        state.beacon.as_ref(),
        state.tokens.as_ref(),
        &state.config,
        query,
        caller_token,
    )
    .await
}

pub async fn search_datasets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<DatasetSearchQuery>,
) -> Result<Json<DatasetSearchResult>> {
    let token = bearer_token(&headers);
    let result = search_datasets(&state, &query, token.as_deref()).await?;
    info!(
        "dataset search returned {} results{}",
        result.count,
        if result.degradation_notice.is_some() {
            " (degraded)"
        } else {
            ""
        }
    );
    Ok(Json(result))
}
