//! Catalogue-side filter listing, derived from facet statistics.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::search_filter::{FilterRange, FilterValueItem, SearchFilter};
use common::search_query::{FilterSource, FilterType};

use crate::filters::FilterSourceBuilder;
use crate::service_utils::ckan_utils::{
    CatalogSearchApi, CkanSearchParams, RawCkanFacetField, RawCkanFacetItem,
};

/// Facet fields requested from the catalogue, with their declared payload
/// type and display label. Everything not listed here stays invisible to
/// the filter catalog.
pub const CKAN_FACET_FIELDS: &[(&str, FilterType, &str)] = &[
    ("organization", FilterType::Dropdown, "Catalogue"),
    ("groups", FilterType::Dropdown, "Theme"),
    ("tags", FilterType::Dropdown, "Keyword"),
    ("res_format", FilterType::Dropdown, "Format"),
    ("metadata_created", FilterType::Datetime, "Created"),
    ("metadata_modified", FilterType::Datetime, "Last modified"),
    ("records_count", FilterType::Number, "Number of records"),
];

/// Timestamp format the catalogue uses in facet values.
pub const CKAN_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn facet_field_keys() -> Vec<String> {
    CKAN_FACET_FIELDS
        .iter()
        .map(|(key, _, _)| key.to_string())
        .collect()
}

pub struct CatalogFacetsBuilder {
    catalog: Arc<dyn CatalogSearchApi>,
}

impl CatalogFacetsBuilder {
    pub fn new(catalog: Arc<dyn CatalogSearchApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl FilterSourceBuilder for CatalogFacetsBuilder {
    fn source(&self) -> FilterSource {
        FilterSource::Ckan
    }

    async fn build(
        &self,
        caller_token: Option<&str>,
        locale: Option<&str>,
    ) -> anyhow::Result<Vec<SearchFilter>> {
        // A zero-row search: only the facet statistics matter here.
        let params = CkanSearchParams {
            q: None,
            fq: None,
            sort: None,
            rows: 0,
            start: 0,
            facet_fields: Some(facet_field_keys()),
            locale: locale.map(str::to_string),
        };
        let result = self.catalog.search(&params, caller_token).await?;
        let mut filters = Vec::new();
        for (key, filter_type, label) in CKAN_FACET_FIELDS {
            let Some(raw_field) = result.search_facets.get(*key) else {
                continue;
            };
            if raw_field.items.is_empty() {
                continue;
            }
            let filter = match filter_type {
                FilterType::Dropdown => dropdown_filter(key, label, raw_field),
                FilterType::Datetime | FilterType::Number => {
                    range_filter(key, label, raw_field, *filter_type)
                }
                _ => continue,
            };
            filters.push(filter);
        }
        Ok(filters)
    }
}

fn dropdown_filter(key: &str, label: &str, raw_field: &RawCkanFacetField) -> SearchFilter {
    let mut values: Vec<FilterValueItem> = raw_field
        .items
        .iter()
        .map(|item| FilterValueItem {
            value: item.name.clone(),
            label: if item.display_name.is_empty() {
                item.name.clone()
            } else {
                item.display_name.clone()
            },
            count: Some(item.count),
        })
        .collect();
    values.sort_by_key(|item| (u64::MAX - item.count.unwrap_or(0), item.value.clone()));
    SearchFilter {
        source: FilterSource::Ckan,
        filter_type: FilterType::Dropdown,
        key: key.to_string(),
        label: label.to_string(),
        group: None,
        values: Some(values),
        range: None,
        entries: None,
    }
}

fn range_filter(
    key: &str,
    label: &str,
    raw_field: &RawCkanFacetField,
    filter_type: FilterType,
) -> SearchFilter {
    SearchFilter {
        source: FilterSource::Ckan,
        filter_type,
        key: key.to_string(),
        label: label.to_string(),
        group: None,
        values: None,
        range: derive_range(&raw_field.items, filter_type),
        entries: None,
    }
}

/// Derives the observed bounds from facet values. Any unparsable value
/// leaves the range unset rather than reporting half-true bounds.
fn derive_range(items: &[RawCkanFacetItem], filter_type: FilterType) -> Option<FilterRange> {
    match filter_type {
        FilterType::Datetime => {
            let mut parsed = Vec::with_capacity(items.len());
            for item in items {
                let stamp = NaiveDateTime::parse_from_str(&item.name, CKAN_DATETIME_FORMAT).ok()?;
                parsed.push((stamp, item.name.as_str()));
            }
            let min = parsed.iter().min_by_key(|(stamp, _)| *stamp)?;
            let max = parsed.iter().max_by_key(|(stamp, _)| *stamp)?;
            Some(FilterRange {
                min: Some(min.1.to_string()),
                max: Some(max.1.to_string()),
            })
        }
        FilterType::Number => {
            let mut parsed = Vec::with_capacity(items.len());
            for item in items {
                let number = item.name.parse::<f64>().ok()?;
                parsed.push((number, item.name.as_str()));
            }
            let min = parsed.iter().min_by(|a, b| a.0.total_cmp(&b.0))?;
            let max = parsed.iter().max_by(|a, b| a.0.total_cmp(&b.0))?;
            Some(FilterRange {
                min: Some(min.1.to_string()),
                max: Some(max.1.to_string()),
            })
        }
        _ => None,
    }
}
