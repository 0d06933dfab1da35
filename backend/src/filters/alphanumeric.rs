//! Alphanumeric term classification.

use common::search_filter::SearchFilter;
use common::search_query::{FilterSource, FilterType};

use crate::filters::beacon_terms::TermClassifier;
use crate::search::beacon_filters::BEACON_QUERY_SCOPE;
use crate::service_utils::beacon_utils::BeaconFilteringTerms;

pub const ALPHANUMERIC_TERM_TYPE: &str = "alphanumeric";

pub struct AlphanumericStrategy;

impl TermClassifier for AlphanumericStrategy {
    /// Keeps alphanumeric terms that declare the individual scope; each
    /// becomes a free-text filter keyed by the term id.
    fn classify(&self, taxonomy: &BeaconFilteringTerms) -> Vec<SearchFilter> {
        taxonomy
            .filtering_terms
            .iter()
            .filter(|term| term.term_type == ALPHANUMERIC_TERM_TYPE)
            .filter(|term| term.scopes.iter().any(|scope| scope == BEACON_QUERY_SCOPE))
            .map(|term| SearchFilter {
                source: FilterSource::Beacon,
                filter_type: FilterType::FreeText,
                key: term.id.clone(),
                label: term.label.clone().unwrap_or_else(|| term.id.clone()),
                group: None,
                values: None,
                range: None,
                entries: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_utils::beacon_utils::BeaconFilteringTerm;

    fn term(id: &str, term_type: &str, scopes: &[&str]) -> BeaconFilteringTerm {
        BeaconFilteringTerm {
            term_type: term_type.to_string(),
            id: id.to_string(),
            label: None,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn individual_scoped_alphanumeric_terms_become_free_text_filters() {
        let taxonomy = BeaconFilteringTerms {
            filtering_terms: vec![term("age", "alphanumeric", &["individual"])],
            resources: Vec::new(),
        };
        let filters = AlphanumericStrategy.classify(&taxonomy);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].filter_type, FilterType::FreeText);
        assert_eq!(filters[0].key, "age");
        assert_eq!(filters[0].label, "age");
    }

    #[test]
    fn other_scopes_and_types_are_dropped() {
        let taxonomy = BeaconFilteringTerms {
            filtering_terms: vec![
                term("biosampleStatus", "alphanumeric", &["biosample"]),
                term("unscoped", "alphanumeric", &[]),
                term("NCIT:C16576", "ontology", &["individual"]),
            ],
            resources: Vec::new(),
        };
        assert!(AlphanumericStrategy.classify(&taxonomy).is_empty());
    }
}
