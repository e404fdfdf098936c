//! Property-data providers.
//!
//! Each provider answers a bounding-box query with candidate records
//! normalized into [`PropertyCandidate`], or reports itself unavailable.
//! Unavailability is a value, not an error: the orchestrator walks the
//! ordered provider chain and takes the first batch it gets.

mod attom;
mod candidate;
mod estated;

pub use attom::AttomProvider;
pub use candidate::{NormalizedBatch, PropertyCandidate};
pub use estated::EstatedProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::config::{Config, HTTP_STATUS_TOO_MANY_REQUESTS, PROVIDER_CONNECT_TIMEOUT_SECS};
use crate::geometry::BoundingBox;

/// A bounding-box query forwarded to a provider.
#[derive(Debug, Clone)]
pub struct BboxQuery {
    pub bbox: BoundingBox,
    pub property_type: String,
    pub listing_status: String,
}

/// Why a provider could not serve a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No endpoint or API key configured for this provider.
    NotConfigured,
    /// The request exceeded its timeout.
    Timeout,
    /// HTTP 429. Not retried in-process; the chain falls through instead.
    RateLimited,
    /// A 5xx response.
    ServerError(u16),
    /// Any other non-success status (bad credentials, bad request, ...).
    Rejected(u16),
    /// Connection-level failure.
    Transport(String),
    /// The response body was not parseable as the provider's schema.
    MalformedResponse,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NotConfigured => f.write_str("not configured"),
            UnavailableReason::Timeout => f.write_str("request timed out"),
            UnavailableReason::RateLimited => f.write_str("rate limited (429)"),
            UnavailableReason::ServerError(code) => write!(f, "server error ({code})"),
            UnavailableReason::Rejected(code) => write!(f, "request rejected ({code})"),
            UnavailableReason::Transport(msg) => write!(f, "transport error: {msg}"),
            UnavailableReason::MalformedResponse => f.write_str("unparseable response body"),
        }
    }
}

/// A provider's refusal, carried as a value for fallback control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUnavailable {
    pub provider: &'static str,
    pub reason: UnavailableReason,
}

impl std::fmt::Display for ProviderUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider {} unavailable: {}", self.provider, self.reason)
    }
}

/// Result of one provider query.
#[derive(Debug)]
pub enum ProviderQuery {
    /// Normalized candidates plus the count of malformed records skipped.
    Candidates(NormalizedBatch),
    /// The provider could not serve the query; try the next one.
    Unavailable(ProviderUnavailable),
}

/// The capability a property-data provider exposes.
///
/// Providers are queried through `dyn PropertyProvider` so the fallback
/// chain is an ordered list; adding a third provider touches no
/// orchestration code.
#[async_trait]
pub trait PropertyProvider: Send + Sync {
    /// Stable provider name, also used to namespace external identifiers.
    fn name(&self) -> &'static str;

    /// Queries the provider for candidates inside the bounding box.
    async fn query_bbox(&self, query: &BboxQuery) -> ProviderQuery;
}

/// Walks the provider chain and returns the first successful batch with
/// the serving provider's name. Returns `None` when every provider is
/// unavailable.
pub async fn query_provider_chain(
    providers: &[Arc<dyn PropertyProvider>],
    query: &BboxQuery,
) -> Option<(&'static str, NormalizedBatch)> {
    for provider in providers {
        debug!("querying provider {}", provider.name());
        match provider.query_bbox(query).await {
            ProviderQuery::Candidates(batch) => {
                debug!(
                    "provider {} returned {} candidates ({} skipped)",
                    provider.name(),
                    batch.candidates.len(),
                    batch.skipped
                );
                return Some((provider.name(), batch));
            }
            ProviderQuery::Unavailable(unavailable) => {
                warn!("{unavailable}, trying next provider");
            }
        }
    }
    None
}

/// Builds the configured provider chain: primary (ATTOM-style) first,
/// fallback (Estated-style) second.
pub fn build_providers(config: &Config) -> anyhow::Result<Vec<Arc<dyn PropertyProvider>>> {
    let timeout = Duration::from_secs(config.provider_timeout_seconds);
    let primary = AttomProvider::new(&config.primary, timeout)?;
    let fallback = EstatedProvider::new(&config.fallback, timeout)?;
    Ok(vec![Arc::new(primary), Arc::new(fallback)])
}

/// Builds an HTTP client with the provider request and connect timeouts.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(PROVIDER_CONNECT_TIMEOUT_SECS))
        .build()
}

/// Sends a provider request and maps every failure class to an
/// [`UnavailableReason`]. Returns the parsed JSON body on success.
pub(crate) async fn execute_provider_request(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderUnavailable> {
    let unavailable = |reason| ProviderUnavailable { provider, reason };

    let response = match request.send().await {
        Ok(r) => r,
        Err(e) if e.is_timeout() => return Err(unavailable(UnavailableReason::Timeout)),
        Err(e) => return Err(unavailable(UnavailableReason::Transport(e.to_string()))),
    };

    let status = response.status();
    if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
        return Err(unavailable(UnavailableReason::RateLimited));
    }
    if status.is_server_error() {
        return Err(unavailable(UnavailableReason::ServerError(status.as_u16())));
    }
    if !status.is_success() {
        return Err(unavailable(UnavailableReason::Rejected(status.as_u16())));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| {
            warn!("provider {provider} returned unparseable body: {e}");
            unavailable(UnavailableReason::MalformedResponse)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        name: &'static str,
        result: Option<usize>, // None = unavailable, Some(n) = n candidates
    }

    #[async_trait]
    impl PropertyProvider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn query_bbox(&self, _query: &BboxQuery) -> ProviderQuery {
            match self.result {
                Some(n) => ProviderQuery::Candidates(NormalizedBatch {
                    candidates: (0..n)
                        .map(|i| PropertyCandidate {
                            external_id: format!("{}:{}", self.name, i),
                            latitude: 0.0,
                            longitude: 0.0,
                            source: self.name,
                            ..PropertyCandidate::empty()
                        })
                        .collect(),
                    skipped: 0,
                }),
                None => ProviderQuery::Unavailable(ProviderUnavailable {
                    provider: self.name,
                    reason: UnavailableReason::ServerError(503),
                }),
            }
        }
    }

    fn query() -> BboxQuery {
        BboxQuery {
            bbox: BoundingBox {
                min_lon: -1.0,
                min_lat: -1.0,
                max_lon: 1.0,
                max_lat: 1.0,
            },
            property_type: "residential".to_string(),
            listing_status: "for_sale".to_string(),
        }
    }

    #[tokio::test]
    async fn test_chain_uses_first_available() {
        let providers: Vec<Arc<dyn PropertyProvider>> = vec![
            Arc::new(StaticProvider {
                name: "first",
                result: Some(2),
            }),
            Arc::new(StaticProvider {
                name: "second",
                result: Some(5),
            }),
        ];
        let (name, batch) = query_provider_chain(&providers, &query()).await.unwrap();
        assert_eq!(name, "first");
        assert_eq!(batch.candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_second() {
        let providers: Vec<Arc<dyn PropertyProvider>> = vec![
            Arc::new(StaticProvider {
                name: "first",
                result: None,
            }),
            Arc::new(StaticProvider {
                name: "second",
                result: Some(3),
            }),
        ];
        let (name, batch) = query_provider_chain(&providers, &query()).await.unwrap();
        assert_eq!(name, "second");
        assert_eq!(batch.candidates.len(), 3);
    }

    #[tokio::test]
    async fn test_chain_exhausted_returns_none() {
        let providers: Vec<Arc<dyn PropertyProvider>> = vec![
            Arc::new(StaticProvider {
                name: "first",
                result: None,
            }),
            Arc::new(StaticProvider {
                name: "second",
                result: None,
            }),
        ];
        assert!(query_provider_chain(&providers, &query()).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_returns_none() {
        let providers: Vec<Arc<dyn PropertyProvider>> = vec![];
        assert!(query_provider_chain(&providers, &query()).await.is_none());
    }
}
