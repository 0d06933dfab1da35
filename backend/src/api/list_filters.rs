//! Filter catalog endpoint.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use common::search_filter::SearchFilter;
use serde::Deserialize;

use crate::api::bearer_token;
use crate::filters;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListFiltersParams {
    #[serde(default)]
    locale: Option<String>,
}

/// Never fails: sources that cannot answer just contribute nothing.
pub async fn list_filters_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListFiltersParams>,
) -> Json<Vec<SearchFilter>> {
    let token = bearer_token(&headers);
    let filters = filters::list_filters(
        &state.filter_builders,
        token.as_deref(),
        params.locale.as_deref(),
    )
    .await;
    Json(filters)
}
