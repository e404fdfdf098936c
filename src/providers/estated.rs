//! Fallback provider client (Estated-style API).
//!
//! Flat record schema with numeric coordinates; authenticates with an
//! `api_key` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::config::types::ProviderSettings;
use crate::providers::candidate::{parse_provider_date, NormalizedBatch, PropertyCandidate};
use crate::providers::{
    build_http_client, execute_provider_request, BboxQuery, PropertyProvider, ProviderQuery,
    ProviderUnavailable, UnavailableReason,
};

const PROVIDER_NAME: &str = "estated";

/// Client for the fallback property-data provider.
pub struct EstatedProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl EstatedProvider {
    /// Builds the client; an unconfigured provider reports `NotConfigured`
    /// on query.
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl PropertyProvider for EstatedProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn query_bbox(&self, query: &BboxQuery) -> ProviderQuery {
        let (Some(endpoint), Some(api_key)) = (&self.endpoint, &self.api_key) else {
            return ProviderQuery::Unavailable(ProviderUnavailable {
                provider: PROVIDER_NAME,
                reason: UnavailableReason::NotConfigured,
            });
        };

        let url = format!("{}/v4/properties/search", endpoint.trim_end_matches('/'));
        let request = self.client.get(&url).query(&[
            ("api_key", api_key.clone()),
            ("min_longitude", query.bbox.min_lon.to_string()),
            ("min_latitude", query.bbox.min_lat.to_string()),
            ("max_longitude", query.bbox.max_lon.to_string()),
            ("max_latitude", query.bbox.max_lat.to_string()),
            ("property_type", query.property_type.clone()),
            ("listing_status", query.listing_status.clone()),
        ]);

        let body = match execute_provider_request(PROVIDER_NAME, request).await {
            Ok(body) => body,
            Err(unavailable) => return ProviderQuery::Unavailable(unavailable),
        };

        let response: EstatedResponse = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => {
                debug!("estated response envelope unparseable: {e}");
                return ProviderQuery::Unavailable(ProviderUnavailable {
                    provider: PROVIDER_NAME,
                    reason: UnavailableReason::MalformedResponse,
                });
            }
        };

        let mut batch = NormalizedBatch::default();
        for value in response.data {
            match normalize_record(value) {
                Some(candidate) => batch.candidates.push(candidate),
                None => batch.skipped += 1,
            }
        }
        ProviderQuery::Candidates(batch)
    }
}

#[derive(Debug, Deserialize)]
struct EstatedResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EstatedRecord {
    id: Option<String>,
    address: Option<EstatedAddress>,
    coordinates: Option<EstatedCoordinates>,
    valuation: Option<EstatedValuation>,
    structure: Option<EstatedStructure>,
    parcel: Option<EstatedParcel>,
    listing: Option<EstatedListing>,
}

#[derive(Debug, Deserialize)]
struct EstatedAddress {
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EstatedCoordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EstatedValuation {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EstatedStructure {
    beds_count: Option<i64>,
    baths: Option<f64>,
    total_area_sq_ft: Option<i64>,
    year_built: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EstatedParcel {
    area_sq_ft: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EstatedListing {
    date: Option<String>,
    #[serde(rename = "type")]
    listing_type: Option<String>,
    photo_url: Option<String>,
}

/// Normalizes one raw record; skip rules match the primary provider.
fn normalize_record(value: serde_json::Value) -> Option<PropertyCandidate> {
    let record: EstatedRecord = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            debug!("skipping malformed estated record: {e}");
            return None;
        }
    };

    let id = record.id.as_ref().filter(|id| !id.is_empty())?;
    let coordinates = record.coordinates.as_ref()?;
    let latitude = coordinates.latitude?;
    let longitude = coordinates.longitude?;

    let address = record.address.as_ref();
    let structure = record.structure.as_ref();
    let listing = record.listing.as_ref();

    Some(PropertyCandidate {
        external_id: format!("{PROVIDER_NAME}:{id}"),
        address: address.and_then(|a| a.street.clone()),
        city: address.and_then(|a| a.city.clone()),
        state: address.and_then(|a| a.state.clone()),
        zip: address.and_then(|a| a.zip_code.clone()),
        latitude,
        longitude,
        price: record.valuation.as_ref().and_then(|v| v.value),
        bedrooms: structure.and_then(|s| s.beds_count),
        bathrooms: structure.and_then(|s| s.baths),
        sqft: structure.and_then(|s| s.total_area_sq_ft),
        lot_sqft: record.parcel.as_ref().and_then(|p| p.area_sq_ft),
        year_built: structure.and_then(|s| s.year_built),
        property_type: listing.and_then(|l| l.listing_type.clone()),
        listing_date: parse_provider_date(listing.and_then(|l| l.date.as_deref())),
        photo_url: listing.and_then(|l| l.photo_url.clone()),
        source: PROVIDER_NAME,
    })
}
