//! Error taxonomy for the discovery backend.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Failures surfaced to callers of the discovery API.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Facet payload does not match its declared type. Client error.
    #[error("{0}")]
    InvalidFacet(String),

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The caller token could not be exchanged for a Beacon token on a path
    /// that has no catalogue fallback.
    #[error("not authorized for the Beacon service")]
    BeaconNotAuthorized,

    /// Catalogue failures are fatal for the whole request. There is no
    /// fallback source for the catalogue.
    #[error("catalogue backend error: {0}")]
    Catalog(#[from] CatalogError),

    /// Beacon failures are only fatal on Beacon-only paths; the search path
    /// absorbs them into a degradation notice instead.
    #[error("beacon backend error: {0}")]
    Beacon(#[from] BeaconError),
}

/// Failure talking to the catalogue backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Failure talking to the Beacon backend.
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl BeaconError {
    /// Human-readable classification attached to otherwise-successful
    /// responses when the Beacon side had to be skipped.
    pub fn degradation_notice(&self) -> String {
        match self {
            BeaconError::Http { status, message } => match status {
                401 => "Beacon service authentication failed. Please check your credentials."
                    .to_string(),
                403 => "Access to the Beacon service was denied.".to_string(),
                404 => "Beacon service endpoint not found. The service may be misconfigured."
                    .to_string(),
                500 => "Beacon service reported an internal error.".to_string(),
                502 | 503 => "Beacon service is temporarily unavailable.".to_string(),
                504 => "Beacon service timed out.".to_string(),
                _ => format!("Beacon service returned HTTP {}: {}", status, message),
            },
            BeaconError::Unavailable(message) => {
                format!("Beacon service unavailable: {}", message)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        let status = match &self {
            DiscoveryError::InvalidFacet(_) => StatusCode::BAD_REQUEST,
            DiscoveryError::DatasetNotFound(_) => StatusCode::NOT_FOUND,
            DiscoveryError::BeaconNotAuthorized => StatusCode::FORBIDDEN,
            DiscoveryError::Catalog(_) => StatusCode::BAD_GATEWAY,
            DiscoveryError::Beacon(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
