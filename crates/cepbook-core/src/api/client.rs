//! Lookup client for the ViaCEP postal code service.
//!
//! `CepClient` normalizes the CEP, answers from the `AddressCache` when it
//! can and otherwise asks a `CepProvider`. The provider is the only part
//! that touches the network, which lets tests swap in a counting mock.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Address;
use crate::utils::normalize_cep;

use super::{AddressCache, LookupError};

// ============================================================================
// Constants
// ============================================================================

/// Default ViaCEP endpoint; requests go to `{base}/{digits}/json/`
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Field ViaCEP sets on a 200 response when the CEP does not exist
const NOT_FOUND_FIELD: &str = "erro";

// ============================================================================
// Provider
// ============================================================================

/// Source of raw lookup payloads.
///
/// Implementations return the body of a successful response and map any
/// non-success status or network problem to a `LookupError`. Interpreting
/// the body is left to `CepClient`.
#[async_trait]
pub trait CepProvider: Send + Sync {
    async fn fetch(&self, digits: &str) -> Result<String, LookupError>;
}

/// HTTP provider backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ViaCepProvider {
    client: Client,
    base_url: String,
}

impl ViaCepProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, digits: &str) -> String {
        format!("{}/{}/json/", self.base_url, digits)
    }
}

#[async_trait]
impl CepProvider for ViaCepProvider {
    async fn fetch(&self, digits: &str) -> Result<String, LookupError> {
        let url = self.url(digits);
        debug!(url = %url, "Requesting address");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::from_status(status, &body));
        }

        Ok(response.text().await?)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Memoizing CEP lookup client.
/// Clones share both the provider and the cache.
#[derive(Clone)]
pub struct CepClient {
    provider: Arc<dyn CepProvider>,
    cache: Arc<AddressCache>,
}

impl CepClient {
    pub fn new(provider: Arc<dyn CepProvider>) -> Self {
        Self::with_cache(provider, Arc::new(AddressCache::new()))
    }

    pub fn with_cache(provider: Arc<dyn CepProvider>, cache: Arc<AddressCache>) -> Self {
        Self { provider, cache }
    }

    /// Build a client talking to the configured ViaCEP endpoint
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = ViaCepProvider::new(
            &config.lookup_base_url(),
            Duration::from_secs(config.request_timeout_secs()),
        )?;
        Ok(Self::new(Arc::new(provider)))
    }

    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    /// Look up an address by CEP.
    ///
    /// Any non-digit characters are stripped first. Whether the remaining
    /// digits form a complete CEP is the caller's concern. Only successful
    /// lookups are cached; failures hit the provider again next time.
    pub async fn lookup(&self, cep: &str) -> Result<Address, LookupError> {
        let key = normalize_cep(cep);

        if let Some(address) = self.cache.get(&key) {
            debug!(cep = %key, "Using cached address");
            return Ok(address);
        }

        let body = match self.provider.fetch(&key).await {
            Ok(body) => body,
            Err(e) => {
                warn!(cep = %key, error = %e, "Address lookup failed");
                return Err(e);
            }
        };

        let address = parse_lookup_body(&key, &body)?;
        self.cache.insert(key, address.clone());
        Ok(address)
    }
}

/// Interpret a successful response body: the `erro` sentinel means the CEP
/// does not exist, anything else must parse as an `Address`.
fn parse_lookup_body(key: &str, body: &str) -> Result<Address, LookupError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LookupError::InvalidResponse(format!("Malformed JSON for {}: {}", key, e)))?;

    // ViaCEP has answered both `"erro": true` and `"erro": "true"`
    let not_found = match value.get(NOT_FOUND_FIELD) {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::String(flag)) => flag == "true",
        _ => false,
    };
    if not_found {
        debug!(cep = %key, "CEP not found");
        return Err(LookupError::NotFound(key.to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| LookupError::InvalidResponse(format!("Unexpected payload for {}: {}", key, e)))
}

// ============================================================================
// Tests
// ============================================================================
