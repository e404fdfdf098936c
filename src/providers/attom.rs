//! Primary provider client (ATTOM-style API).
//!
//! The snapshot endpoint takes a bounding box plus type/status filters and
//! authenticates with an `apikey` header. Coordinates arrive string-encoded
//! and most record fields live in nested objects, all of which normalize
//! into the flat candidate shape.

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

const PROVIDER_NAME: &str = "attom";

/// Client for the primary property-data provider.
pub struct AttomProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl AttomProvider {
    /// Builds the client; an unconfigured provider is still constructed and
    /// reports `NotConfigured` on query so the chain can skip past it.
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl PropertyProvider for AttomProvider {
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

        let url = format!("{}/property/snapshot", endpoint.trim_end_matches('/'));
        let request = self
            .client
            .get(&url)
            .header("apikey", api_key)
            .header("accept", "application/json")
            .query(&[
                ("minLongitude", query.bbox.min_lon.to_string()),
                ("minLatitude", query.bbox.min_lat.to_string()),
                ("maxLongitude", query.bbox.max_lon.to_string()),
                ("maxLatitude", query.bbox.max_lat.to_string()),
                ("propertyType", query.property_type.clone()),
                ("status", query.listing_status.clone()),
            ]);

        let body = match execute_provider_request(PROVIDER_NAME, request).await {
            Ok(body) => body,
            Err(unavailable) => return ProviderQuery::Unavailable(unavailable),
        };

        let response: AttomResponse = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => {
                debug!("attom response envelope unparseable: {e}");
                return ProviderQuery::Unavailable(ProviderUnavailable {
                    provider: PROVIDER_NAME,
                    reason: UnavailableReason::MalformedResponse,
                });
            }
        };

        let mut batch = NormalizedBatch::default();
        for value in response.property {
            match normalize_record(value) {
                Some(candidate) => batch.candidates.push(candidate),
                None => batch.skipped += 1,
            }
        }
        ProviderQuery::Candidates(batch)
    }
}

#[derive(Debug, Deserialize)]
struct AttomResponse {
    #[serde(default)]
    property: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AttomRecord {
    identifier: Option<AttomIdentifier>,
    address: Option<AttomAddress>,
    location: Option<AttomLocation>,
    sale: Option<AttomSale>,
    building: Option<AttomBuilding>,
    lot: Option<AttomLot>,
}

#[derive(Debug, Deserialize)]
struct AttomIdentifier {
    #[serde(rename = "attomId")]
    attom_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AttomAddress {
    line1: Option<String>,
    locality: Option<String>,
    #[serde(rename = "countrySubd")]
    country_subd: Option<String>,
    postal1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttomLocation {
    // String-encoded decimal degrees.
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttomSale {
    amount: Option<AttomAmount>,
    #[serde(rename = "saleTransDate")]
    sale_trans_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttomAmount {
    #[serde(rename = "saleAmt")]
    sale_amt: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AttomBuilding {
    rooms: Option<AttomRooms>,
    size: Option<AttomSize>,
    summary: Option<AttomSummary>,
}

#[derive(Debug, Deserialize)]
struct AttomRooms {
    beds: Option<i64>,
    #[serde(rename = "bathsTotal")]
    baths_total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AttomSize {
    #[serde(rename = "universalSize")]
    universal_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AttomSummary {
    #[serde(rename = "yearBuilt")]
    year_built: Option<i64>,
    #[serde(rename = "propClass")]
    prop_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttomLot {
    #[serde(rename = "lotSize2")]
    lot_size2: Option<i64>,
}

/// Normalizes one raw record. Returns `None` (skip) when the record is not
/// an object of the expected shape, lacks an id, or lacks parseable
/// coordinates; every other missing field is simply unknown.
fn normalize_record(value: serde_json::Value) -> Option<PropertyCandidate> {
    let record: AttomRecord = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            debug!("skipping malformed attom record: {e}");
            return None;
        }
    };

    let attom_id = record.identifier.as_ref()?.attom_id?;
    let location = record.location.as_ref()?;
    let latitude: f64 = location.latitude.as_deref()?.parse().ok()?;
    let longitude: f64 = location.longitude.as_deref()?.parse().ok()?;

    let address = record.address.as_ref();
    let sale = record.sale.as_ref();
    let building = record.building.as_ref();

    Some(PropertyCandidate {
        external_id: format!("{PROVIDER_NAME}:{attom_id}"),
        address: address.and_then(|a| a.line1.clone()),
        city: address.and_then(|a| a.locality.clone()),
        state: address.and_then(|a| a.country_subd.clone()),
        zip: address.and_then(|a| a.postal1.clone()),
        latitude,
        longitude,
        price: sale.and_then(|s| s.amount.as_ref()).and_then(|a| a.sale_amt),
        bedrooms: building
            .and_then(|b| b.rooms.as_ref())
            .and_then(|r| r.beds),
        bathrooms: building
            .and_then(|b| b.rooms.as_ref())
            .and_then(|r| r.baths_total),
        sqft: building
            .and_then(|b| b.size.as_ref())
            .and_then(|s| s.universal_size),
        lot_sqft: record.lot.as_ref().and_then(|l| l.lot_size2),
        year_built: building
            .and_then(|b| b.summary.as_ref())
            .and_then(|s| s.year_built),
        property_type: building
            .and_then(|b| b.summary.as_ref())
            .and_then(|s| s.prop_class.clone()),
        listing_date: parse_provider_date(sale.and_then(|s| s.sale_trans_date.as_deref())),
        photo_url: None,
        source: PROVIDER_NAME,
    })
}
