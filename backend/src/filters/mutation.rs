//! Structured mutation filter, declared statically.

use common::search_filter::{FilterEntryField, SearchFilter};
use common::search_query::{FilterSource, FilterType};

use crate::filters::beacon_terms::TermClassifier;
use crate::service_utils::beacon_utils::BeaconFilteringTerms;

pub const MUTATION_FILTER_KEY: &str = "mutation";

pub struct MutationStrategy;

impl TermClassifier for MutationStrategy {
    /// The mutation filter does not come from the taxonomy: its entry
    /// fields map straight onto Beacon request parameters.
    fn classify(&self, _taxonomy: &BeaconFilteringTerms) -> Vec<SearchFilter> {
        vec![SearchFilter {
            source: FilterSource::Beacon,
            filter_type: FilterType::Entries,
            key: MUTATION_FILTER_KEY.to_string(),
            label: "Mutation".to_string(),
            group: None,
            values: None,
            range: None,
            entries: Some(vec![
                FilterEntryField {
                    key: "geneId".to_string(),
                    label: "Gene".to_string(),
                },
                FilterEntryField {
                    key: "aminoacidChange".to_string(),
                    label: "Amino acid change".to_string(),
                },
                FilterEntryField {
                    key: "variantType".to_string(),
                    label: "Variant type".to_string(),
                },
                FilterEntryField {
                    key: "assemblyId".to_string(),
                    label: "Assembly".to_string(),
                },
            ]),
        }]
    }
}
