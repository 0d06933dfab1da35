//! Shared application state behind the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::filters::FilterSourceBuilder;
use crate::filters::beacon_terms::BeaconTermsBuilder;
use crate::filters::catalog_facets::CatalogFacetsBuilder;
use crate::filters::term_cache::FilteringTermsCache;
use crate::service_utils::beacon_utils::{BeaconApi, BeaconClient};
use crate::service_utils::ckan_utils::{CatalogSearchApi, CkanClient};
use crate::service_utils::keycloak_utils::{KeycloakTokenExchanger, TokenExchangeApi};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogSearchApi>,
    pub beacon: Arc<dyn BeaconApi>,
    pub tokens: Arc<dyn TokenExchangeApi>,
    pub filter_builders: Arc<Vec<Arc<dyn FilterSourceBuilder>>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog: Arc<dyn CatalogSearchApi> = Arc::new(CkanClient::new(&config)?);
        let beacon: Arc<dyn BeaconApi> = Arc::new(BeaconClient::new(&config)?);
        let tokens: Arc<dyn TokenExchangeApi> = Arc::new(KeycloakTokenExchanger::new(&config)?);
        let cache = FilteringTermsCache::new(
            config.terms_cache_capacity,
            Duration::from_secs(config.terms_cache_ttl_secs),
        );
        let filter_builders: Arc<Vec<Arc<dyn FilterSourceBuilder>>> = Arc::new(vec![
            Arc::new(CatalogFacetsBuilder::new(catalog.clone())),
            Arc::new(BeaconTermsBuilder::new(
                beacon.clone(),
                tokens.clone(),
                cache,
            )),
        ]);
        Ok(Self {
            config: Arc::new(config),
            catalog,
            beacon,
            tokens,
            filter_builders,
        })
    }
}
