//! End-to-end federation behavior over hand-rolled backend fakes.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use backend::config::Config;
use backend::error::{BeaconError, CatalogError, DiscoveryError};
use backend::search::aggregator::search_datasets;
use backend::service_utils::beacon_utils::{
    BeaconApi, BeaconFilteringTerms, BeaconRequest, BeaconResultSet, BeaconResultSets,
    BeaconResultSetsResponse,
};
use backend::service_utils::ckan_utils::{
    CatalogSearchApi, CkanSearchParams, RawCkanDataset, RawCkanSearchResult,
};
use backend::service_utils::keycloak_utils::TokenExchangeApi;

use common::search_query::{DatasetSearchQuery, Facet, FilterSource, FilterType};

fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        ckan_url: "http://ckan.invalid".to_string(),
        beacon_url: "http://beacon.invalid".to_string(),
        keycloak_token_url: "http://keycloak.invalid/token".to_string(),
        keycloak_client_id: "discovery-backend".to_string(),
        keycloak_client_secret: String::new(),
        keycloak_audience: "beacon".to_string(),
        catalog_timeout_secs: 30,
        beacon_timeout_secs: 10,
        terms_cache_ttl_secs: 300,
        terms_cache_capacity: 64,
        id_collection_rows: 1000,
    }
}

fn dataset(id: &str, records_count: Option<u64>) -> RawCkanDataset {
    RawCkanDataset {
        id: id.to_string(),
        name: id.to_string(),
        title: format!("Dataset {}", id),
        notes: String::new(),
        metadata_created: None,
        metadata_modified: None,
        organization: None,
        tags: Vec::new(),
        groups: Vec::new(),
        publisher_name: None,
        records_count,
    }
}

fn catalog_result(datasets: Vec<RawCkanDataset>) -> RawCkanSearchResult {
    RawCkanSearchResult {
        count: datasets.len() as u64,
        results: datasets,
        search_facets: BTreeMap::new(),
    }
}

#[derive(Default)]
struct FakeCatalog {
    collect_result: RawCkanSearchResult,
    fetch_result: RawCkanSearchResult,
    fail: bool,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    last_fetch_ids: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn new(collect: Vec<RawCkanDataset>, fetch: Vec<RawCkanDataset>) -> Self {
        Self {
            collect_result: catalog_result(collect),
            fetch_result: catalog_result(fetch),
            ..Default::default()
        }
    }
}

#[async_trait]
impl CatalogSearchApi for FakeCatalog {
    async fn search(
        &self,
        _params: &CkanSearchParams,
        _token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CatalogError::Http {
                status: 500,
                message: "catalogue exploded".to_string(),
            });
        }
        Ok(self.collect_result.clone())
    }

    async fn fetch_by_ids(
        &self,
        ids: &[String],
        _sort: Option<&str>,
        _rows: u64,
        _start: u64,
        _facet_fields: Option<Vec<String>>,
        _token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_fetch_ids.lock().unwrap() = ids.to_vec();
        Ok(self.fetch_result.clone())
    }
}

enum FakeBeaconMode {
    Sets(Vec<(String, i64)>),
    Fail(u16),
}

struct FakeBeacon {
    mode: FakeBeaconMode,
    calls: AtomicUsize,
}

impl FakeBeacon {
    fn with_counts(counts: &[(&str, i64)]) -> Self {
        Self {
            mode: FakeBeaconMode::Sets(
                counts
                    .iter()
                    .map(|(id, count)| (id.to_string(), *count))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            mode: FakeBeaconMode::Fail(status),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BeaconApi for FakeBeacon {
    async fn query_individuals(
        &self,
        _token: &str,
        _request: &BeaconRequest,
    ) -> Result<BeaconResultSetsResponse, BeaconError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            FakeBeaconMode::Sets(counts) => Ok(BeaconResultSetsResponse {
                response_summary: None,
                response: Some(BeaconResultSets {
                    result_sets: counts
                        .iter()
                        .map(|(id, count)| BeaconResultSet {
                            id: id.clone(),
                            set_type: "dataset".to_string(),
                            exists: *count > 0,
                            results_count: Some(*count),
                        })
                        .collect(),
                }),
            }),
            FakeBeaconMode::Fail(status) => Err(BeaconError::Http {
                status: *status,
                message: "refused".to_string(),
            }),
        }
    }

    async fn query_variants(
        &self,
        _token: &str,
        _request: &BeaconRequest,
    ) -> Result<serde_json::Value, BeaconError> {
        Ok(serde_json::json!({}))
    }

    async fn filtering_terms(&self, _token: &str) -> Result<BeaconFilteringTerms, BeaconError> {
        Ok(BeaconFilteringTerms::default())
    }
}

struct FakeTokens {
    grant: Option<String>,
    calls: AtomicUsize,
}

impl FakeTokens {
    fn granting() -> Self {
        Self {
            grant: Some("beacon-token".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn refusing() -> Self {
        Self {
            grant: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenExchangeApi for FakeTokens {
    async fn exchange(&self, _caller_token: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grant.clone()
    }
}

fn ckan_facet(key: &str, value: &str) -> Facet {
    Facet::with_value(FilterSource::Ckan, FilterType::Dropdown, key, value)
}

fn beacon_facet(term: &str) -> Facet {
    Facet::with_value(FilterSource::Beacon, FilterType::Dropdown, "NCIT", term)
}

fn federated_query() -> DatasetSearchQuery {
    DatasetSearchQuery {
        facets: vec![ckan_facet("tags", "covid"), beacon_facet("NCIT:C16576")],
        ..Default::default()
    }
}

#[tokio::test]
async fn both_sides_matching_intersect_with_the_smaller_count() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10)), dataset("d2", Some(20))],
        vec![dataset("d1", Some(10))],
    );
    let beacon = FakeBeacon::with_counts(&[("d1", 15), ("d3", 30)]);
    let tokens = FakeTokens::granting();

    let query = federated_query();
    let result = search_datasets(&catalog, &beacon, &tokens, &test_config(), &query, Some("jwt"))
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].id, "d1");
    assert_eq!(result.results[0].records_count, Some(10));
    assert_eq!(result.degradation_notice, None);
    assert_eq!(result.query, query);
    assert_eq!(*catalog.last_fetch_ids.lock().unwrap(), vec!["d1".to_string()]);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn beacon_failure_degrades_to_catalogue_only_with_a_notice() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10)), dataset("d2", Some(20))],
        vec![dataset("d1", Some(10)), dataset("d2", Some(20))],
    );
    let beacon = FakeBeacon::failing(401);
    let tokens = FakeTokens::granting();

    let result = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        Some("jwt"),
    )
    .await
    .unwrap();

    assert_eq!(result.count, 2);
    assert_eq!(
        result.degradation_notice.as_deref(),
        Some("Beacon service authentication failed. Please check your credentials.")
    );
    let fetched = catalog.last_fetch_ids.lock().unwrap().clone();
    assert_eq!(fetched, vec!["d1".to_string(), "d2".to_string()]);
}

#[tokio::test]
async fn disabling_the_beacon_side_skips_it_entirely() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10))],
        vec![dataset("d1", Some(10))],
    );
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::granting();

    let query = DatasetSearchQuery {
        include_beacon: false,
        ..federated_query()
    };
    let result = search_datasets(&catalog, &beacon, &tokens, &test_config(), &query, Some("jwt"))
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.results[0].records_count, Some(10));
    assert_eq!(result.degradation_notice, None);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn queries_without_beacon_facets_never_reach_the_beacon() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10))],
        vec![dataset("d1", Some(10))],
    );
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::granting();

    let query = DatasetSearchQuery {
        facets: vec![ckan_facet("tags", "covid")],
        ..Default::default()
    };
    let result = search_datasets(&catalog, &beacon, &tokens, &test_config(), &query, Some("jwt"))
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.degradation_notice, None);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn anonymous_callers_get_catalogue_results_without_beacon_narrowing() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10)), dataset("d2", None)],
        vec![dataset("d1", Some(10)), dataset("d2", None)],
    );
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::granting();

    let result = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(result.count, 2);
    assert_eq!(result.degradation_notice, None);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refused_token_exchange_silently_skips_the_beacon() {
    let catalog = FakeCatalog::new(
        vec![dataset("d1", Some(10))],
        vec![dataset("d1", Some(10))],
    );
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::refusing();

    let result = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        Some("jwt"),
    )
    .await
    .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.degradation_notice, None);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_intersection_returns_an_empty_result_without_fetching() {
    let catalog = FakeCatalog::new(vec![dataset("d1", Some(10))], Vec::new());
    let beacon = FakeBeacon::with_counts(&[]);
    let tokens = FakeTokens::granting();

    let result = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        Some("jwt"),
    )
    .await
    .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.results.is_empty());
    assert!(result.facets.is_empty());
    assert_eq!(result.degradation_notice, None);
    assert_eq!(catalog.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn beacon_count_fills_in_missing_catalogue_counts() {
    let catalog = FakeCatalog::new(vec![dataset("d1", None)], vec![dataset("d1", None)]);
    let beacon = FakeBeacon::with_counts(&[("d1", 7)]);
    let tokens = FakeTokens::granting();

    let result = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        Some("jwt"),
    )
    .await
    .unwrap();

    assert_eq!(result.results[0].records_count, Some(7));
}

#[tokio::test]
async fn malformed_facets_fail_before_any_backend_call() {
    let catalog = FakeCatalog::new(vec![dataset("d1", Some(10))], Vec::new());
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::granting();

    let query = DatasetSearchQuery {
        // Free-text facet without an operator.
        facets: vec![Facet::with_value(
            FilterSource::Beacon,
            FilterType::FreeText,
            "age",
            "40",
        )],
        ..Default::default()
    };
    let err = search_datasets(&catalog, &beacon, &tokens, &test_config(), &query, Some("jwt"))
        .await
        .unwrap_err();

    match err {
        DiscoveryError::InvalidFacet(message) => {
            assert_eq!(message, "Facet operator must not be null");
        }
        other => panic!("expected InvalidFacet, got {:?}", other),
    }
    assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(beacon.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn catalogue_failure_fails_the_whole_request() {
    let catalog = FakeCatalog {
        fail: true,
        ..FakeCatalog::new(Vec::new(), Vec::new())
    };
    let beacon = FakeBeacon::with_counts(&[("d1", 5)]);
    let tokens = FakeTokens::granting();

    let err = search_datasets(
        &catalog,
        &beacon,
        &tokens,
        &test_config(),
        &federated_query(),
        Some("jwt"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DiscoveryError::Catalog(_)));
}
