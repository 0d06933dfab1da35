//! Common library exports shared between the discovery backend and its clients.

extern crate serde;


pub mod search_query;
pub mod search_result;
pub mod search_filter;
pub mod search_const;
