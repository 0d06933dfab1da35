//! Environment-driven configuration, read once at startup.

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub ckan_url: String,
    pub beacon_url: String,
    pub keycloak_token_url: String,
    pub keycloak_client_id: String,
    pub keycloak_client_secret: String,
    pub keycloak_audience: String,
    pub catalog_timeout_secs: u64,
    // Beacon requests must fail fast enough to degrade instead of
    // stalling the whole search.
    pub beacon_timeout_secs: u64,
    pub terms_cache_ttl_secs: u64,
    pub terms_cache_capacity: u64,
    pub id_collection_rows: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            ckan_url: env_or("CKAN_URL", "http://127.0.0.1:5000"),
            beacon_url: env_or("BEACON_URL", "http://127.0.0.1:5050/api"),
            keycloak_token_url: env_or(
                "KEYCLOAK_TOKEN_URL",
                "http://127.0.0.1:8180/realms/discovery/protocol/openid-connect/token",
            ),
            keycloak_client_id: env_or("KEYCLOAK_CLIENT_ID", "discovery-backend"),
            keycloak_client_secret: env_or("KEYCLOAK_CLIENT_SECRET", ""),
            keycloak_audience: env_or("KEYCLOAK_AUDIENCE", "beacon"),
            catalog_timeout_secs: env_parse("CATALOG_TIMEOUT_SECS", 30),
            beacon_timeout_secs: env_parse("BEACON_TIMEOUT_SECS", 10),
            terms_cache_ttl_secs: env_parse("FILTERING_TERMS_CACHE_TTL_SECS", 300),
            terms_cache_capacity: env_parse("FILTERING_TERMS_CACHE_CAPACITY", 64),
            id_collection_rows: env_parse("ID_COLLECTION_ROWS", 1000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or(default.to_string())
}

fn env_parse(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
