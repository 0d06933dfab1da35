//! Federated dataset discovery engine.
//!
//! Searches a metadata catalogue and a Beacon network together: the
//! catalogue is the source of record, the Beacon side narrows by genomic
//! and phenotypic criteria when the caller is entitled to it.

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod search;
pub mod service_utils;
pub mod state;
