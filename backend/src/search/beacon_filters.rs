//! Translation of unified facets into a Beacon query.
//!
//! Unlike the catalogue side, translation here validates: a facet whose
//! payload does not match its declared type rejects the whole request
//! before any backend is called.

use std::collections::BTreeMap;

use common::search_query::{DatasetSearchQuery, Facet, FilterSource, FilterType};

use crate::error::DiscoveryError;
use crate::service_utils::beacon_utils::{
    BeaconFilter, BeaconPagination, BeaconQuery, BeaconRequest, BeaconRequestMeta,
};

pub const BEACON_API_VERSION: &str = "2.0";
pub const BEACON_QUERY_SCOPE: &str = "individual";

/// Builds the Beacon request for the query's Beacon-tagged facets.
///
/// Granularity, result-set mode and pagination are fixed: the engine only
/// needs per-dataset counts, never the matching records themselves.
pub fn build_beacon_request(query: &DatasetSearchQuery) -> Result<BeaconRequest, DiscoveryError> {
    let mut filters = Vec::new();
    let mut request_parameters = BTreeMap::new();
    for facet in query.facets.iter().filter(|f| f.source == FilterSource::Beacon) {
        match facet.filter_type {
            FilterType::Dropdown => filters.push(ontology_filter(facet)?),
            FilterType::FreeText => filters.push(alphanumeric_filter(facet)?),
            FilterType::Entries => merge_entries(facet, &mut request_parameters)?,
            other => {
                return Err(DiscoveryError::InvalidFacet(format!(
                    "Facet type {:?} is not supported for Beacon queries",
                    other
                )));
            }
        }
    }
    Ok(BeaconRequest {
        meta: BeaconRequestMeta {
            api_version: BEACON_API_VERSION.to_string(),
        },
        query: BeaconQuery {
            filters,
            request_parameters,
            include_resultset_responses: "HIT".to_string(),
            pagination: BeaconPagination { skip: 0, limit: 1 },
            requested_granularity: "record".to_string(),
            test_mode: false,
        },
    })
}

fn ontology_filter(facet: &Facet) -> Result<BeaconFilter, DiscoveryError> {
    let value = non_blank(facet.value.as_deref()).ok_or_else(|| {
        DiscoveryError::InvalidFacet("Facet value must not be null or empty".to_string())
    })?;
    Ok(BeaconFilter::Ontology {
        id: value.to_string(),
        scope: BEACON_QUERY_SCOPE.to_string(),
    })
}

fn alphanumeric_filter(facet: &Facet) -> Result<BeaconFilter, DiscoveryError> {
    let operator = non_blank(facet.operator.as_deref()).ok_or_else(|| {
        DiscoveryError::InvalidFacet("Facet operator must not be null".to_string())
    })?;
    let value = non_blank(facet.value.as_deref()).ok_or_else(|| {
        DiscoveryError::InvalidFacet("Facet value must not be null or empty".to_string())
    })?;
    let key = non_blank(Some(facet.key.as_str())).ok_or_else(|| {
        DiscoveryError::InvalidFacet("Facet key must not be null or empty".to_string())
    })?;
    Ok(BeaconFilter::Alphanumeric {
        id: key.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
        scope: BEACON_QUERY_SCOPE.to_string(),
    })
}

fn merge_entries(
    facet: &Facet,
    request_parameters: &mut BTreeMap<String, String>,
) -> Result<(), DiscoveryError> {
    const MESSAGE: &str = "Facet entries must not be empty or contain invalid key-value pairs";
    let entries = facet
        .entries
        .as_ref()
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| DiscoveryError::InvalidFacet(MESSAGE.to_string()))?;
    for entry in entries {
        let key = non_blank(Some(entry.key.as_str()))
            .ok_or_else(|| DiscoveryError::InvalidFacet(MESSAGE.to_string()))?;
        let value = non_blank(Some(entry.value.as_str()))
            .ok_or_else(|| DiscoveryError::InvalidFacet(MESSAGE.to_string()))?;
        request_parameters.insert(key.to_string(), value.to_string());
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
