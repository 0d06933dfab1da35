//! Beacon v2 client and its wire models.
//!
//! The Beacon protocol speaks camelCase JSON over POST endpoints. Requests
//! are pinned to record granularity with a single-entry page: the discovery
//! engine only ever needs the per-dataset result sets, never the records.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::BeaconError;
use crate::service_utils::ckan_utils::truncated;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconRequest {
    pub meta: BeaconRequestMeta,
    pub query: BeaconQuery,
}

impl BeaconRequest {
    /// True when the query carries at least one filter or request
    /// parameter. Unconstrained requests are never sent upstream.
    pub fn has_constraints(&self) -> bool {
        !self.query.filters.is_empty() || !self.query.request_parameters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconRequestMeta {
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconQuery {
    pub filters: Vec<BeaconFilter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_parameters: BTreeMap<String, String>,
    pub include_resultset_responses: String,
    pub pagination: BeaconPagination,
    pub requested_granularity: String,
    pub test_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconPagination {
    pub skip: u64,
    pub limit: u64,
}

// Untagged: an alphanumeric filter is an ontology filter plus operator
// and value, so it must come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeaconFilter {
    Alphanumeric {
        id: String,
        operator: String,
        value: String,
        scope: String,
    },
    Ontology {
        id: String,
        scope: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResultSetsResponse {
    #[serde(default)]
    pub response_summary: Option<BeaconResponseSummary>,
    #[serde(default)]
    pub response: Option<BeaconResultSets>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResponseSummary {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub num_total_results: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResultSets {
    #[serde(default)]
    pub result_sets: Vec<BeaconResultSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResultSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub set_type: String,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub results_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilteringTermsEnvelope {
    #[serde(default)]
    pub response: Option<BeaconFilteringTerms>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconFilteringTerms {
    #[serde(default)]
    pub filtering_terms: Vec<BeaconFilteringTerm>,
    #[serde(default)]
    pub resources: Vec<BeaconResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconFilteringTerm {
    #[serde(default, rename = "type")]
    pub term_type: String,
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_space_prefix: Option<String>,
}

/// Beacon query surface. The production implementation talks to a Beacon
/// network endpoint over HTTP; tests substitute their own.
#[async_trait]
pub trait BeaconApi: Send + Sync {
    /// Runs the individuals query and returns the per-dataset result sets.
    async fn query_individuals(
        &self,
        token: &str,
        request: &BeaconRequest,
    ) -> Result<BeaconResultSetsResponse, BeaconError>;

    /// Runs the genomic-variants query and returns the upstream body as-is.
    async fn query_variants(
        &self,
        token: &str,
        request: &BeaconRequest,
    ) -> Result<serde_json::Value, BeaconError>;

    /// Fetches the advertised filtering-term taxonomy.
    async fn filtering_terms(&self, token: &str) -> Result<BeaconFilteringTerms, BeaconError>;
}

pub struct BeaconClient {
    http: reqwest::Client,
    base_url: String,
}

impl BeaconClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.beacon_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.beacon_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json(
        &self,
        path: &str,
        token: &str,
        request: &BeaconRequest,
    ) -> Result<String, BeaconError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| BeaconError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BeaconError::Unavailable(e.to_string()))?;
        debug!(
            "beacon {} returned HTTP {} with {} bytes",
            path,
            status.as_u16(),
            body.len()
        );
        if status.is_client_error() || status.is_server_error() {
            return Err(BeaconError::Http {
                status: status.as_u16(),
                message: truncated(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl BeaconApi for BeaconClient {
    async fn query_individuals(
        &self,
        token: &str,
        request: &BeaconRequest,
    ) -> Result<BeaconResultSetsResponse, BeaconError> {
        let body = self.post_json("/individuals", token, request).await?;
        serde_json::from_str(&body)
            .map_err(|e| BeaconError::Unavailable(format!("unexpected response body: {}", e)))
    }

    async fn query_variants(
        &self,
        token: &str,
        request: &BeaconRequest,
    ) -> Result<serde_json::Value, BeaconError> {
        let body = self.post_json("/g_variants", token, request).await?;
        serde_json::from_str(&body)
            .map_err(|e| BeaconError::Unavailable(format!("unexpected response body: {}", e)))
    }

    async fn filtering_terms(&self, token: &str) -> Result<BeaconFilteringTerms, BeaconError> {
        let url = format!("{}/filtering_terms", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BeaconError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BeaconError::Unavailable(e.to_string()))?;
        if status.is_client_error() || status.is_server_error() {
            return Err(BeaconError::Http {
                status: status.as_u16(),
                message: truncated(&body),
            });
        }
        let envelope: RawFilteringTermsEnvelope = serde_json::from_str(&body)
            .map_err(|e| BeaconError::Unavailable(format!("unexpected response body: {}", e)))?;
        Ok(envelope.response.unwrap_or_default())
    }
}
