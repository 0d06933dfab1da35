//! Beacon-side match collection.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::BeaconError;
use crate::service_utils::beacon_utils::{BeaconApi, BeaconRequest, BeaconResultSetsResponse};

pub const BEACON_DATASET_SET_TYPE: &str = "dataset";

/// Outcome of the Beacon collection step.
///
/// "Skipped" and "queried with zero matches" are different answers: an
/// empty `Counts` map still intersects the catalogue candidates down to
/// nothing, while `NotApplicable` leaves them untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum BeaconCollection {
    /// Dataset id to number of matching individuals.
    Counts(BTreeMap<String, u64>),
    /// The Beacon side was not consulted for this query.
    NotApplicable,
    /// The Beacon side failed; the notice explains the degradation.
    Unavailable { notice: String },
}

/// Runs the individuals query and folds every failure into a degradation
/// notice. This function never propagates an error: the catalogue result
/// must survive a dead Beacon.
pub async fn collect_beacon_ids(
    beacon: &dyn BeaconApi,
    token: &str,
    request: &BeaconRequest,
) -> BeaconCollection {
    match beacon.query_individuals(token, request).await {
        Ok(response) => BeaconCollection::Counts(dataset_counts(response)),
        Err(err) => {
            warn!("beacon individuals query failed: {}", err);
            BeaconCollection::Unavailable {
                notice: err.degradation_notice(),
            }
        }
    }
}

/// Extracts per-dataset counts, dropping result sets that are not dataset
/// scoped, carry a blank id, or report no matches.
fn dataset_counts(response: BeaconResultSetsResponse) -> BTreeMap<String, u64> {
    let result_sets = response
        .response
        .map(|sets| sets.result_sets)
        .unwrap_or_default();
    let mut counts = BTreeMap::new();
    for set in result_sets {
        if set.set_type != BEACON_DATASET_SET_TYPE {
            continue;
        }
        if set.id.trim().is_empty() {
            continue;
        }
        let Some(count) = set.results_count.filter(|count| *count > 0) else {
            continue;
        };
        counts.insert(set.id, count as u64);
    }
    counts
}
