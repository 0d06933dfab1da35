//! Catalogue-side id collection.

use std::collections::BTreeMap;

use common::search_query::DatasetSearchQuery;
use tracing::debug;

use crate::error::CatalogError;
use crate::service_utils::ckan_utils::{CatalogSearchApi, CkanSearchParams};

/// Collects the ids of every dataset matching the catalogue side of the
/// query, mapped to that dataset's record count where the catalogue
/// reports one. Paging and sorting are deliberately absent here: the
/// collection phase wants the whole candidate set.
pub async fn collect_catalog_ids(
    catalog: &dyn CatalogSearchApi,
    query: &DatasetSearchQuery,
    facet_query: &str,
    rows: u64,
    token: Option<&str>,
) -> Result<BTreeMap<String, Option<u64>>, CatalogError> {
    let params = CkanSearchParams {
        q: query.query.clone(),
        fq: (!facet_query.is_empty()).then(|| facet_query.to_string()),
        sort: None,
        rows,
        start: 0,
        facet_fields: None,
        locale: None,
    };
    let result = catalog.search(&params, token).await?;
    let mut counts = BTreeMap::new();
    for dataset in result.results {
        if dataset.id.trim().is_empty() {
            continue;
        }
        counts.insert(dataset.id, dataset.records_count);
    }
    debug!("catalogue collection matched {} datasets", counts.len());
    Ok(counts)
}
