//! TTL cache for the Beacon filtering-term taxonomy.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::service_utils::beacon_utils::{BeaconApi, BeaconFilteringTerms};

/// Cache keyed by a digest of the exchanged token, so listings running
/// under the same authorization share one upstream fetch until the entry
/// expires. Failed fetches are not cached.
#[derive(Clone)]
pub struct FilteringTermsCache {
    cache: Cache<String, Arc<BeaconFilteringTerms>>,
}

impl FilteringTermsCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Loads through the cache. Concurrent misses for the same key
    /// collapse into a single upstream call.
    pub async fn get_or_fetch(
        &self,
        beacon: &dyn BeaconApi,
        token: &str,
    ) -> anyhow::Result<Arc<BeaconFilteringTerms>> {
        let key = sha256::digest(token);
        self.cache
            .try_get_with(key, async {
                let terms = beacon.filtering_terms(token).await?;
                Ok(Arc::new(terms))
            })
            .await
            .map_err(|err: Arc<crate::error::BeaconError>| {
                anyhow::anyhow!("filtering terms fetch failed: {}", err)
            })
    }
}
