//! The provider-neutral candidate shape.

use chrono::NaiveDate;

/// A property record normalized from a provider response.
///
/// Coordinates and the external identifier are mandatory; a record missing
/// either is malformed and skipped during normalization. Everything else
/// defaults to unknown.
#[derive(Debug, Clone)]
pub struct PropertyCandidate {
    /// Provider-issued identifier, namespaced as `<provider>:<id>` so ids
    /// from different providers can never collide in the cache.
    pub external_id: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<f64>,
    pub sqft: Option<i64>,
    pub lot_sqft: Option<i64>,
    pub year_built: Option<i64>,
    pub property_type: Option<String>,
    pub listing_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    /// Name of the provider the record came from.
    pub source: &'static str,
}

impl PropertyCandidate {
    /// A blank candidate for tests to fill in.
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            external_id: String::new(),
            address: None,
            city: None,
            state: None,
            zip: None,
            latitude: 0.0,
            longitude: 0.0,
            price: None,
            bedrooms: None,
            bathrooms: None,
            sqft: None,
            lot_sqft: None,
            year_built: None,
            property_type: None,
            listing_date: None,
            photo_url: None,
            source: "test",
        }
    }
}

/// A batch of normalized candidates with an itemized skip count.
///
/// A malformed record never aborts the batch; it is skipped and counted.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub candidates: Vec<PropertyCandidate>,
    pub skipped: usize,
}

/// Parses a provider date field leniently; a malformed date is unknown,
/// not an error.
pub(crate) fn parse_provider_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
