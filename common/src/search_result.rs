use serde::{Deserialize, Serialize};

use crate::search_query::DatasetSearchQuery;


// `degradation_notice` explains a non-fatal secondary-source failure; it
// stays `None` when that side was skipped on purpose or succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSearchResult {
    pub query: DatasetSearchQuery,
    pub count: u64,
    pub results: Vec<SearchedDataset>,
    pub facets: Vec<FacetSummary>,
    pub degradation_notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedDataset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub catalogue: Option<String>,
    pub publisher_name: Option<String>,
    pub themes: Vec<String>,
    pub keywords: Vec<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    // The tighter bound wins when both sources report a count.
    pub records_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetSummary {
    pub field: String,
    pub items: Vec<FacetSummaryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetSummaryItem {
    pub value: String,
    pub display_value: String,
    pub count: u64,
}
