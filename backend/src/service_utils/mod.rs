//! Clients for the remote services the discovery engine federates.

pub mod beacon_utils;
pub mod ckan_utils;
pub mod keycloak_utils;
