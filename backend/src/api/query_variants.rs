//! Genomic variant query pass-through endpoint.
//!
//! Unlike the search path there is no catalogue to fall back to, so a
//! missing entitlement or a dead Beacon is an error here.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use common::search_query::DatasetSearchQuery;

use crate::api::bearer_token;
use crate::error::{DiscoveryError, Result};
use crate::search::beacon_filters::build_beacon_request;
use crate::state::AppState;

pub async fn query_variants(
    state: &AppState,
    query: &DatasetSearchQuery,
    caller_token: Option<&str>,
) -> Result<serde_json::Value> {
    let request = build_beacon_request(query)?;
    let caller_token = caller_token.ok_or(DiscoveryError::BeaconNotAuthorized)?;
    let beacon_token = state
        .tokens
        .exchange(caller_token)
        .await
        .ok_or(DiscoveryError::BeaconNotAuthorized)?;
    let response = state
        .beacon
        .query_variants(&beacon_token, &request)
        .await
        .map_err(DiscoveryError::Beacon)?;
    Ok(response)
}

pub async fn query_variants_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<DatasetSearchQuery>,
) -> Result<Json<serde_json::Value>> {
    let token = bearer_token(&headers);
    let response = query_variants(&state, &query, token.as_deref()).await?;
    Ok(Json(response))
}
