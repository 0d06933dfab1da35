//! Token exchange against the identity provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;

/// Exchanges a caller token for a Beacon-audience token.
#[async_trait]
pub trait TokenExchangeApi: Send + Sync {
    /// Returns `None` when the caller is not entitled to query the Beacon
    /// service. Exchange failures are not errors on the search path: the
    /// Beacon side is simply skipped.
    async fn exchange(&self, caller_token: &str) -> Option<String>;
}

pub struct KeycloakTokenExchanger {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    audience: String,
}

impl KeycloakTokenExchanger {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.beacon_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            token_url: config.keycloak_token_url.clone(),
            client_id: config.keycloak_client_id.clone(),
            client_secret: config.keycloak_client_secret.clone(),
            audience: config.keycloak_audience.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[async_trait]
impl TokenExchangeApi for KeycloakTokenExchanger {
    async fn exchange(&self, caller_token: &str) -> Option<String> {
        let form = [
            (
                "grant_type",
                "urn:ietf:params:oauth:grant-type:token-exchange",
            ),
            ("subject_token", caller_token),
            (
                "subject_token_type",
                "urn:ietf:params:oauth:token-type:access_token",
            ),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("audience", self.audience.as_str()),
        ];
        let response = match self.http.post(&self.token_url).form(&form).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("token exchange request failed: {}", err);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("token exchange rejected with HTTP {}", response.status().as_u16());
            return None;
        }
        match response.json::<RawTokenResponse>().await {
            Ok(token) => token.access_token,
            Err(err) => {
                warn!("token exchange returned an unreadable body: {}", err);
                None
            }
        }
    }
}
