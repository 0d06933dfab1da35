//! CKAN catalogue client and its raw wire models.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::CatalogError;
use crate::search::facet_query::id_filter_query;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanEnvelope {
    pub success: bool,
    #[serde(default)]
    pub result: Option<RawCkanSearchResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCkanSearchResult {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<RawCkanDataset>,
    #[serde(default)]
    pub search_facets: BTreeMap<String, RawCkanFacetField>,
}

// Only the fields the discovery surface needs are modelled; everything
// else is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanDataset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub metadata_created: Option<String>,
    #[serde(default)]
    pub metadata_modified: Option<String>,
    #[serde(default)]
    pub organization: Option<RawCkanOrganization>,
    #[serde(default)]
    pub tags: Vec<RawCkanTag>,
    #[serde(default)]
    pub groups: Vec<RawCkanGroup>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub records_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanOrganization {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanTag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCkanFacetField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<RawCkanFacetItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCkanFacetItem {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CkanSearchParams {
    pub q: Option<String>,
    pub fq: Option<String>,
    pub sort: Option<String>,
    pub rows: u64,
    pub start: u64,
    pub facet_fields: Option<Vec<String>>,
    pub locale: Option<String>,
}

/// Catalogue search surface. The production implementation talks to CKAN
/// over HTTP; tests substitute their own.
#[async_trait]
pub trait CatalogSearchApi: Send + Sync {
    async fn search(
        &self,
        params: &CkanSearchParams,
        token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError>;

    /// Fetches full records for an explicit id set, with paging, sorting
    /// and facet statistics applied by the catalogue.
    async fn fetch_by_ids(
        &self,
        ids: &[String],
        sort: Option<&str>,
        rows: u64,
        start: u64,
        facet_fields: Option<Vec<String>>,
        token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError>;
}

pub struct CkanClient {
    http: reqwest::Client,
    base_url: String,
}

impl CkanClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.catalog_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.ckan_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogSearchApi for CkanClient {
    async fn search(
        &self,
        params: &CkanSearchParams,
        token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError> {
        let url = format!("{}/api/3/action/package_search", self.base_url);
        let mut request = self.http.get(&url).query(&[
            ("rows", params.rows.to_string()),
            ("start", params.start.to_string()),
        ]);
        if let Some(q) = &params.q {
            request = request.query(&[("q", q)]);
        }
        if let Some(fq) = &params.fq {
            request = request.query(&[("fq", fq)]);
        }
        if let Some(sort) = &params.sort {
            request = request.query(&[("sort", sort)]);
        }
        if let Some(fields) = &params.facet_fields {
            // CKAN wants the facet field list as a JSON-encoded array.
            let encoded = serde_json::to_string(fields)
                .map_err(|e| CatalogError::Decode(e.to_string()))?;
            request = request.query(&[
                ("facet", "true".to_string()),
                ("facet.field", encoded),
                ("facet.limit", "-1".to_string()),
            ]);
        }
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }
        if let Some(locale) = &params.locale {
            request = request.header(reqwest::header::ACCEPT_LANGUAGE, locale);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        debug!(
            "catalogue search returned HTTP {} with {} bytes",
            status.as_u16(),
            body.len()
        );
        if status.is_client_error() || status.is_server_error() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: truncated(&body),
            });
        }
        let envelope: RawCkanEnvelope =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: "catalogue reported success=false".to_string(),
            });
        }
        envelope
            .result
            .ok_or_else(|| CatalogError::Decode("missing result object".to_string()))
    }

    async fn fetch_by_ids(
        &self,
        ids: &[String],
        sort: Option<&str>,
        rows: u64,
        start: u64,
        facet_fields: Option<Vec<String>>,
        token: Option<&str>,
    ) -> Result<RawCkanSearchResult, CatalogError> {
        let params = CkanSearchParams {
            q: None,
            fq: Some(id_filter_query(ids)).filter(|fq| !fq.is_empty()),
            sort: sort.map(str::to_string),
            rows,
            start,
            facet_fields,
            locale: None,
        };
        self.search(&params, token).await
    }
}

/// Keeps upstream error bodies short enough to log and return.
pub(crate) fn truncated(body: &str) -> String {
    const LIMIT: usize = 300;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let cut = body
        .char_indices()
        .take_while(|(i, _)| *i < LIMIT)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    format!("{}...", &body[..cut])
}
