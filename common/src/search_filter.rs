//! Filter catalog entries: the source-merged list of filterable fields.

use serde::{Deserialize, Serialize};

use crate::search_query::{FilterSource, FilterType};


// The payload mirrors the declared type: DROPDOWN filters carry `values`,
// DATETIME and NUMBER carry a `range`, ENTRIES carries the input template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub source: FilterSource,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub values: Option<Vec<FilterValueItem>>,
    #[serde(default)]
    pub range: Option<FilterRange>,
    #[serde(default)]
    pub entries: Option<Vec<FilterEntryField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterValueItem {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub count: Option<u64>,
}

// Bounds stay the backend's original strings, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntryField {
    pub key: String,
    pub label: String,
}
