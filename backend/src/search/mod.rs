//! Federated search core: query translation, collection, aggregation.

pub mod aggregator;
pub mod beacon_collector;
pub mod beacon_filters;
pub mod catalog_collector;
pub mod facet_query;
