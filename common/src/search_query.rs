//! Shared search query models and helpers.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSource {
    Ckan,
    Beacon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    Dropdown,
    FreeText,
    Datetime,
    Number,
    Entries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryOperator {
    #[default]
    And,
    Or,
}

impl QueryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::And => "AND",
            QueryOperator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetEntry {
    pub key: String,
    pub value: String,
}

// The payload mirrors the declared type: `value` for DROPDOWN, `operator`
// plus `value` for FREE_TEXT, `entries` for ENTRIES, `min`/`max` for
// DATETIME and NUMBER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub source: FilterSource,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub entries: Option<Vec<FacetEntry>>,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
}

impl Facet {
    pub fn with_value(
        source: FilterSource,
        filter_type: FilterType,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            source,
            filter_type,
            key: key.into(),
            value: Some(value.into()),
            operator: None,
            entries: None,
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSearchQuery {
    pub query: Option<String>,
    pub facets: Vec<Facet>,
    pub sort: Option<String>,
    pub rows: Option<u64>,
    pub start: Option<u64>,
    pub operator: QueryOperator,
    pub include_beacon: bool,
}

impl Default for DatasetSearchQuery {
    fn default() -> Self {
        Self {
            query: None,
            facets: Vec::new(),
            sort: None,
            rows: None,
            start: None,
            operator: QueryOperator::And,
            include_beacon: true,
        }
    }
}
