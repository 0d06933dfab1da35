//! Catalogue facet query construction.
//!
//! Builds the `fq` fragment sent to the catalogue. The builder is pure:
//! facets that do not apply are skipped, never rejected, and equal inputs
//! always render the same fragment.

use common::search_query::{Facet, FilterSource, FilterType, QueryOperator};

/// Renders the catalogue constraint fragment for the given facets.
///
/// Values sharing a key are quoted and joined with `operator`; distinct
/// keys are always joined with `AND`. Datetime and number facets carrying
/// bounds render as `key:[min TO max]`. Keys keep their first-seen input
/// order. The empty string means "no constraint".
pub fn build_facet_query(facets: &[Facet], operator: QueryOperator) -> String {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for facet in facets {
        if facet.source != FilterSource::Ckan {
            continue;
        }
        let key = facet.key.trim();
        if key.is_empty() {
            continue;
        }
        let term = match facet.filter_type {
            FilterType::Datetime | FilterType::Number => range_term(facet),
            _ => value_term(facet),
        };
        let Some(term) = term else { continue };
        match groups.iter_mut().find(|(seen, _)| seen == key) {
            Some((_, terms)) => terms.push(term),
            None => groups.push((key.to_string(), vec![term])),
        }
    }
    let joiner = format!(" {} ", operator.as_str());
    groups
        .into_iter()
        .map(|(key, terms)| format!("{}:({})", key, terms.join(&joiner)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Identifier constraint selecting exactly the given dataset ids. An
/// empty id set renders no constraint at all, never `id:()`.
pub fn id_filter_query(ids: &[String]) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let quoted = ids
        .iter()
        .map(|id| quoted(id))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("id:({})", quoted)
}

fn value_term(facet: &Facet) -> Option<String> {
    let value = facet.value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    Some(quoted(value))
}

fn range_term(facet: &Facet) -> Option<String> {
    let min = facet.min.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let max = facet.max.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if min.is_none() && max.is_none() {
        // A range facet without bounds may still carry a literal value.
        return value_term(facet);
    }
    Some(format!(
        "[{} TO {}]",
        min.unwrap_or("*"),
        max.unwrap_or("*")
    ))
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
