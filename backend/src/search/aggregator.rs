//! Search orchestration: collect on both sides, intersect or fall back,
//! fetch, assemble.

use std::collections::BTreeMap;

use common::search_const::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use common::search_query::DatasetSearchQuery;
use common::search_result::{DatasetSearchResult, FacetSummary, FacetSummaryItem, SearchedDataset};
use tracing::debug;

use crate::config::Config;
use crate::error::DiscoveryError;
use crate::filters::catalog_facets::facet_field_keys;
use crate::search::beacon_collector::{BeaconCollection, collect_beacon_ids};
use crate::search::beacon_filters::build_beacon_request;
use crate::search::catalog_collector::collect_catalog_ids;
use crate::search::facet_query::build_facet_query;
use crate::service_utils::beacon_utils::{BeaconApi, BeaconRequest};
use crate::service_utils::ckan_utils::{CatalogSearchApi, RawCkanDataset, RawCkanFacetField};
use crate::service_utils::keycloak_utils::TokenExchangeApi;

/// Runs the federated dataset search.
///
/// Both collectors run concurrently. The catalogue is the source of
/// record: its failure fails the request, while every Beacon-side failure
/// degrades to a catalogue-only result with a notice.
pub async fn search_datasets(
    catalog: &dyn CatalogSearchApi,
    beacon: &dyn BeaconApi,
    tokens: &dyn TokenExchangeApi,
    config: &Config,
    query: &DatasetSearchQuery,
    caller_token: Option<&str>,
) -> Result<DatasetSearchResult, DiscoveryError> {
    let facet_query = build_facet_query(&query.facets, query.operator);
    // Translate up front so a malformed facet rejects the request before
    // any backend call.
    let beacon_request = if query.include_beacon {
        Some(build_beacon_request(query)?)
    } else {
        None
    };

    let (catalog_counts, beacon_collection) = tokio::join!(
        collect_catalog_ids(
            catalog,
            query,
            &facet_query,
            config.id_collection_rows,
            caller_token
        ),
        run_beacon_collection(beacon, tokens, beacon_request.as_ref(), caller_token),
    );
    let catalog_counts = catalog_counts?;

    let (merged, degradation_notice) = merge_collections(catalog_counts, &beacon_collection);
    debug!("merged candidate set holds {} datasets", merged.len());

    if merged.is_empty() {
        return Ok(DatasetSearchResult {
            query: query.clone(),
            count: 0,
            results: Vec::new(),
            facets: Vec::new(),
            degradation_notice,
        });
    }

    let ids: Vec<String> = merged.keys().cloned().collect();
    let rows = query.rows.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let start = query.start.unwrap_or(0);
    let fetched = catalog
        .fetch_by_ids(
            &ids,
            query.sort.as_deref(),
            rows,
            start,
            Some(facet_field_keys()),
            caller_token,
        )
        .await
        .map_err(DiscoveryError::Catalog)?;

    let results: Vec<SearchedDataset> = fetched
        .results
        .into_iter()
        .filter(|raw| merged.contains_key(&raw.id))
        .map(|raw| {
            let records_count = merged.get(&raw.id).copied().flatten();
            searched_dataset(raw, records_count)
        })
        .collect();
    let facets = facet_summaries(fetched.search_facets);

    Ok(DatasetSearchResult {
        query: query.clone(),
        count: results.len() as u64,
        results,
        facets,
        degradation_notice,
    })
}

/// Decides whether the Beacon side applies at all, and collects if so.
/// Absent constraints, absent caller credentials and a refused token
/// exchange all mean "not applicable", silently.
async fn run_beacon_collection(
    beacon: &dyn BeaconApi,
    tokens: &dyn TokenExchangeApi,
    request: Option<&BeaconRequest>,
    caller_token: Option<&str>,
) -> BeaconCollection {
    let Some(request) = request else {
        return BeaconCollection::NotApplicable;
    };
    if !request.has_constraints() {
        return BeaconCollection::NotApplicable;
    }
    let Some(caller_token) = caller_token else {
        return BeaconCollection::NotApplicable;
    };
    let Some(beacon_token) = tokens.exchange(caller_token).await else {
        return BeaconCollection::NotApplicable;
    };
    collect_beacon_ids(beacon, &beacon_token, request).await
}

/// Merges the two collections. With Beacon counts present the result is a
/// pure intersection keeping the smaller count per id; otherwise the
/// catalogue set passes through, with a notice when the Beacon side failed.
fn merge_collections(
    catalog: BTreeMap<String, Option<u64>>,
    beacon: &BeaconCollection,
) -> (BTreeMap<String, Option<u64>>, Option<String>) {
    match beacon {
        BeaconCollection::NotApplicable => (catalog, None),
        BeaconCollection::Unavailable { notice } => (catalog, Some(notice.clone())),
        BeaconCollection::Counts(counts) => {
            let mut merged = BTreeMap::new();
            for (id, catalog_count) in catalog {
                let Some(beacon_count) = counts.get(&id) else {
                    continue;
                };
                let count = match catalog_count {
                    Some(count) => count.min(*beacon_count),
                    None => *beacon_count,
                };
                merged.insert(id, Some(count));
            }
            (merged, None)
        }
    }
}

/// Maps a raw catalogue record onto the discovery result shape.
pub(crate) fn searched_dataset(raw: RawCkanDataset, records_count: Option<u64>) -> SearchedDataset {
    SearchedDataset {
        id: raw.id,
        title: raw.title,
        description: raw.notes,
        catalogue: raw.organization.map(|org| {
            if org.title.is_empty() {
                org.name
            } else {
                org.title
            }
        }),
        publisher_name: raw.publisher_name,
        themes: raw
            .groups
            .into_iter()
            .map(|group| {
                if group.title.is_empty() {
                    group.name
                } else {
                    group.title
                }
            })
            .collect(),
        keywords: raw
            .tags
            .into_iter()
            .map(|tag| tag.display_name.unwrap_or(tag.name))
            .collect(),
        created_at: raw.metadata_created,
        modified_at: raw.metadata_modified,
        records_count,
    }
}

/// Shapes the catalogue facet statistics, most frequent values first.
fn facet_summaries(raw: BTreeMap<String, RawCkanFacetField>) -> Vec<FacetSummary> {
    raw.into_iter()
        .map(|(field, raw_field)| {
            let mut items: Vec<FacetSummaryItem> = raw_field
                .items
                .into_iter()
                .map(|item| FacetSummaryItem {
                    display_value: if item.display_name.is_empty() {
                        item.name.clone()
                    } else {
                        item.display_name
                    },
                    value: item.name,
                    count: item.count,
                })
                .collect();
            items.sort_by_key(|item| (u64::MAX - item.count, item.value.clone()));
            FacetSummary { field, items }
        })
        .collect()
}
