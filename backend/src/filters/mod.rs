//! Filter catalog: the merged list of filterable fields across sources.

pub mod alphanumeric;
pub mod beacon_terms;
pub mod catalog_facets;
pub mod mutation;
pub mod ontology;
pub mod term_cache;

use std::sync::Arc;

use async_trait::async_trait;
use common::search_filter::SearchFilter;
use common::search_query::FilterSource;
use tracing::warn;

/// One source's contribution to the filter catalog.
#[async_trait]
pub trait FilterSourceBuilder: Send + Sync {
    fn source(&self) -> FilterSource;

    async fn build(
        &self,
        caller_token: Option<&str>,
        locale: Option<&str>,
    ) -> anyhow::Result<Vec<SearchFilter>>;
}

/// Collects every registered source concurrently. A failing source logs a
/// warning and contributes nothing; the others still answer.
pub async fn list_filters(
    builders: &[Arc<dyn FilterSourceBuilder>],
    caller_token: Option<&str>,
    locale: Option<&str>,
) -> Vec<SearchFilter> {
    let tasks = builders
        .iter()
        .map(|builder| builder.build(caller_token, locale));
    let outcomes = futures::future::join_all(tasks).await;
    let mut filters = Vec::new();
    for (builder, outcome) in builders.iter().zip(outcomes) {
        match outcome {
            Ok(mut entries) => filters.append(&mut entries),
            Err(err) => warn!("filter source {:?} failed: {:#}", builder.source(), err),
        }
    }
    filters
}
