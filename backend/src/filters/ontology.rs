//! Ontology term classification: one dropdown per known namespace.

use std::collections::BTreeMap;

use common::search_filter::{FilterValueItem, SearchFilter};
use common::search_query::{FilterSource, FilterType};

use crate::filters::beacon_terms::TermClassifier;
use crate::service_utils::beacon_utils::BeaconFilteringTerms;

pub struct OntologyStrategy;

impl TermClassifier for OntologyStrategy {
    /// Takes every term with a colon-delimited namespace in its id and
    /// groups them by namespace. Namespaces with no matching resource are
    /// dropped: a dropdown needs a display name.
    fn classify(&self, taxonomy: &BeaconFilteringTerms) -> Vec<SearchFilter> {
        let resource_names = resource_names(taxonomy);
        let mut groups: BTreeMap<String, (String, Vec<FilterValueItem>)> = BTreeMap::new();
        for term in &taxonomy.filtering_terms {
            let Some((namespace, _)) = term.id.split_once(':') else {
                continue;
            };
            if namespace.is_empty() {
                continue;
            }
            let Some(resource_name) = lookup_resource(&resource_names, namespace) else {
                continue;
            };
            let entry = groups
                .entry(namespace.to_string())
                .or_insert_with(|| (resource_name.to_string(), Vec::new()));
            entry.1.push(FilterValueItem {
                value: term.id.clone(),
                label: term.label.clone().unwrap_or_else(|| term.id.clone()),
                count: None,
            });
        }
        groups
            .into_iter()
            .map(|(namespace, (resource_name, values))| SearchFilter {
                source: FilterSource::Beacon,
                filter_type: FilterType::Dropdown,
                key: namespace,
                label: resource_name.clone(),
                group: Some(resource_name),
                values: Some(values),
                range: None,
                entries: None,
            })
            .collect()
    }
}

/// Resources indexed by namespace prefix, falling back to the resource id
/// for entries that do not declare a prefix.
fn resource_names(taxonomy: &BeaconFilteringTerms) -> BTreeMap<&str, &str> {
    let mut names: BTreeMap<&str, &str> = BTreeMap::new();
    for resource in &taxonomy.resources {
        let name = resource.name.as_deref().unwrap_or(resource.id.as_str());
        if let Some(prefix) = resource.name_space_prefix.as_deref() {
            names.insert(prefix, name);
        }
        names.entry(resource.id.as_str()).or_insert(name);
    }
    names
}

fn lookup_resource<'a>(names: &BTreeMap<&str, &'a str>, namespace: &str) -> Option<&'a str> {
    if let Some(name) = names.get(namespace) {
        return Some(name);
    }
    // Resource ids are lowercase by convention, prefixes often are not.
    names.get(namespace.to_ascii_lowercase().as_str()).copied()
}
