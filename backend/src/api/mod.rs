//! Caller-facing API operations and their axum handlers.

mod search_datasets;
pub use search_datasets::{search_datasets, search_datasets_handler};

mod retrieve_dataset;
pub use retrieve_dataset::{retrieve_dataset, retrieve_dataset_handler};

mod list_filters;
pub use list_filters::list_filters_handler;

mod query_variants;
pub use query_variants::{query_variants, query_variants_handler};

use axum::http::HeaderMap;

/// Pulls the caller token out of the Authorization header, with or
/// without the `Bearer` prefix. Absent or blank means anonymous.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
