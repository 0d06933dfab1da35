//! Beacon-side filter listing, derived from the filtering-term taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use common::search_filter::SearchFilter;
use common::search_query::FilterSource;

use crate::filters::FilterSourceBuilder;
use crate::filters::alphanumeric::AlphanumericStrategy;
use crate::filters::mutation::MutationStrategy;
use crate::filters::ontology::OntologyStrategy;
use crate::filters::term_cache::FilteringTermsCache;
use crate::service_utils::beacon_utils::{BeaconApi, BeaconFilteringTerms};
use crate::service_utils::keycloak_utils::TokenExchangeApi;

/// Classifies a slice of the raw taxonomy into filter entries.
pub trait TermClassifier: Send + Sync {
    fn classify(&self, taxonomy: &BeaconFilteringTerms) -> Vec<SearchFilter>;
}

pub struct BeaconTermsBuilder {
    beacon: Arc<dyn BeaconApi>,
    tokens: Arc<dyn TokenExchangeApi>,
    cache: FilteringTermsCache,
    /// Applied in order; each strategy owns one slice of the taxonomy.
    strategies: Vec<Box<dyn TermClassifier>>,
}

impl BeaconTermsBuilder {
    pub fn new(
        beacon: Arc<dyn BeaconApi>,
        tokens: Arc<dyn TokenExchangeApi>,
        cache: FilteringTermsCache,
    ) -> Self {
        Self {
            beacon,
            tokens,
            cache,
            strategies: vec![
                Box::new(OntologyStrategy),
                Box::new(AlphanumericStrategy),
                Box::new(MutationStrategy),
            ],
        }
    }
}

#[async_trait]
impl FilterSourceBuilder for BeaconTermsBuilder {
    fn source(&self) -> FilterSource {
        FilterSource::Beacon
    }

    /// Without credentials, or when the exchange refuses the caller, the
    /// Beacon side contributes nothing and says nothing.
    async fn build(
        &self,
        caller_token: Option<&str>,
        _locale: Option<&str>,
    ) -> anyhow::Result<Vec<SearchFilter>> {
        let Some(caller_token) = caller_token else {
            return Ok(Vec::new());
        };
        let Some(beacon_token) = self.tokens.exchange(caller_token).await else {
            return Ok(Vec::new());
        };
        let taxonomy = self.cache.get_or_fetch(self.beacon.as_ref(), &beacon_token).await?;
        let mut filters = Vec::new();
        for strategy in &self.strategies {
            filters.extend(strategy.classify(&taxonomy));
        }
        Ok(filters)
    }
}
