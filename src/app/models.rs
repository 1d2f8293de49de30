//! Data models for the listing proxy
//!
//! The upstream catalog transmits prices and condo fees as strings. They are
//! parsed once here, when a [`RawListing`] becomes a [`Listing`]; everything
//! downstream works with numbers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::channels;

/// Downstream consumer of the catalog, each with its own eligibility rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Zap portal
    Zap,
    /// Viva Real portal
    VivaReal,
}

impl Channel {
    /// Every channel, in bucket order
    pub const ALL: [Channel; 2] = [Channel::Zap, Channel::VivaReal];

    /// Name as sent in the `source` header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zap => channels::ZAP,
            Self::VivaReal => channels::VIVAREAL,
        }
    }

    /// Parse a header value; matching is exact and case-sensitive
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            channels::ZAP => Some(Self::Zap),
            channels::VIVAREAL => Some(Self::VivaReal),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_header(s).ok_or_else(|| format!("unknown channel: {s}"))
    }
}

/// Listing business type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessType {
    Sale,
    Rental,
    /// Anything else the upstream sends; qualifies for no channel
    #[default]
    #[serde(other)]
    Unknown,
}

/// Geographic point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "null_as_default")]
    pub lon: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
}

impl Location {
    /// The upstream uses (0, 0) for listings without a location
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub precision: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub neighborhood: String,
    #[serde(deserialize_with = "null_as_default")]
    pub geo_location: GeoLocation,
}

/// Pricing block as transmitted by the upstream
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPricingInfo {
    pub price: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub business_type: BusinessType,
    pub monthly_condo_fee: Option<Value>,
    pub yearly_iptu: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    pub rental_total_price: Option<Value>,
}

/// Listing record as transmitted by the upstream
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawListing {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub usable_areas: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub listing_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub listing_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parking_spaces: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(deserialize_with = "null_as_default")]
    pub bathrooms: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub bedrooms: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub pricing_infos: RawPricingInfo,
}

/// Pricing block with numeric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub price: f64,
    pub business_type: BusinessType,
    /// `None` when the upstream value is absent or not a number
    pub monthly_condo_fee: Option<f64>,
    pub yearly_iptu: Option<String>,
    pub period: String,
    pub rental_total_price: Option<String>,
}

/// A property listing with parsed pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub usable_areas: i64,
    pub listing_type: String,
    pub listing_status: String,
    pub created_at: String,
    pub updated_at: String,
    pub parking_spaces: i64,
    pub owner: bool,
    pub images: Vec<String>,
    pub address: Address,
    pub bathrooms: i64,
    pub bedrooms: i64,
    pub pricing_infos: PricingInfo,
}

impl Listing {
    /// Convert an upstream record, parsing its numeric fields
    ///
    /// Returns `None` when the price cannot be parsed; such a listing belongs
    /// to no channel.
    pub fn from_raw(raw: RawListing) -> Option<Self> {
        let price = raw.pricing_infos.price.as_ref().and_then(parse_number)?;
        let monthly_condo_fee = raw
            .pricing_infos
            .monthly_condo_fee
            .as_ref()
            .and_then(parse_number);

        Some(Self {
            id: raw.id,
            usable_areas: raw.usable_areas,
            listing_type: raw.listing_type,
            listing_status: raw.listing_status,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            parking_spaces: raw.parking_spaces,
            owner: raw.owner,
            images: raw.images,
            address: raw.address,
            bathrooms: raw.bathrooms,
            bedrooms: raw.bedrooms,
            pricing_infos: PricingInfo {
                price,
                business_type: raw.pricing_infos.business_type,
                monthly_condo_fee,
                yearly_iptu: raw.pricing_infos.yearly_iptu.as_ref().map(value_text),
                period: raw.pricing_infos.period,
                rental_total_price: raw.pricing_infos.rental_total_price.as_ref().map(value_text),
            },
        })
    }

    /// Listing coordinates
    pub fn location(&self) -> Location {
        self.address.geo_location.location
    }

    pub fn price(&self) -> f64 {
        self.pricing_infos.price
    }

    pub fn business_type(&self) -> BusinessType {
        self.pricing_infos.business_type
    }
}

/// Parse a numeric field that may arrive as a string or a JSON number
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Decode `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Immutable, cached set of listings eligible for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBucket {
    pub channel: Channel,
    pub listings: Vec<Listing>,
}

impl ChannelBucket {
    pub fn new(channel: Channel, listings: Vec<Listing>) -> Self {
        Self { channel, listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Both buckets produced by one population pass
#[derive(Debug, Clone)]
pub struct ChannelBuckets {
    pub zap: Arc<ChannelBucket>,
    pub vivareal: Arc<ChannelBucket>,
}

impl ChannelBuckets {
    /// Bucket for the given channel
    pub fn get(&self, channel: Channel) -> &Arc<ChannelBucket> {
        match channel {
            Channel::Zap => &self.zap,
            Channel::VivaReal => &self.vivareal,
        }
    }
}

/// Paginated response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub listings: Vec<Listing>,
    #[serde(rename = "pageNumber")]
    pub page_number: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "propertiestotalCount")]
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from(value: Value) -> RawListing {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_channel_header_parsing_is_exact() {
        assert_eq!(Channel::from_header("zap"), Some(Channel::Zap));
        assert_eq!(Channel::from_header("vivareal"), Some(Channel::VivaReal));
        assert_eq!(Channel::from_header("ZAP"), None);
        assert_eq!(Channel::from_header(" zap"), None);
        assert_eq!(Channel::from_header(""), None);
        assert_eq!("vivareal".parse::<Channel>(), Ok(Channel::VivaReal));
        assert_eq!(Channel::VivaReal.to_string(), "vivareal");
    }

    #[test]
    fn test_raw_listing_decodes_upstream_shape() {
        let raw = raw_from(json!({
            "usableAreas": 70,
            "listingType": "USED",
            "createdAt": "2017-04-22T18:39:31.138Z",
            "listingStatus": "ACTIVE",
            "id": "7baf2775d4a2",
            "parkingSpaces": 1,
            "updatedAt": "2017-04-22T18:39:31.138Z",
            "owner": false,
            "images": ["https://example.com/a.jpg"],
            "address": {
                "city": "",
                "neighborhood": "",
                "geoLocation": {
                    "precision": "ROOFTOP",
                    "location": { "lon": -46.716542, "lat": -23.502555 }
                }
            },
            "bathrooms": 1,
            "bedrooms": 2,
            "pricingInfos": {
                "yearlyIptu": "60",
                "price": "276000",
                "businessType": "SALE",
                "monthlyCondoFee": "0"
            }
        }));

        let listing = Listing::from_raw(raw).unwrap();
        assert_eq!(listing.id, "7baf2775d4a2");
        assert_eq!(listing.price(), 276000.0);
        assert_eq!(listing.business_type(), BusinessType::Sale);
        assert_eq!(listing.pricing_infos.monthly_condo_fee, Some(0.0));
        assert_eq!(listing.pricing_infos.yearly_iptu.as_deref(), Some("60"));
        assert_eq!(listing.location().lat, -23.502555);
        assert!(!listing.location().is_unset());
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let catalog: Vec<RawListing> = serde_json::from_value(json!([
            {
                "id": "nulls",
                "usableAreas": null,
                "updatedAt": null,
                "owner": null,
                "images": null,
                "address": {
                    "city": null,
                    "neighborhood": null,
                    "geoLocation": { "precision": null, "location": { "lat": -23.5, "lon": null } }
                },
                "pricingInfos": {
                    "price": "5000",
                    "businessType": null,
                    "monthlyCondoFee": null,
                    "period": null
                }
            },
            { "id": null, "address": null, "pricingInfos": null }
        ]))
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let listing = Listing::from_raw(catalog[0].clone()).unwrap();
        assert_eq!(listing.usable_areas, 0);
        assert_eq!(listing.updated_at, "");
        assert!(listing.images.is_empty());
        assert_eq!(listing.address.city, "");
        assert_eq!(listing.location(), Location { lat: -23.5, lon: 0.0 });
        assert_eq!(listing.business_type(), BusinessType::Unknown);
        assert_eq!(listing.pricing_infos.monthly_condo_fee, None);

        assert_eq!(catalog[1], RawListing::default());
        assert!(Listing::from_raw(catalog[1].clone()).is_none());
    }

    #[test]
    fn test_unparseable_price_is_rejected() {
        for price in [json!("abc"), json!(""), json!(null), json!("NaN"), json!([1])] {
            let raw = raw_from(json!({ "id": "x", "pricingInfos": { "price": price } }));
            assert!(Listing::from_raw(raw).is_none());
        }
        let raw = raw_from(json!({ "id": "x", "pricingInfos": {} }));
        assert!(Listing::from_raw(raw).is_none());
    }

    #[test]
    fn test_condo_fee_is_optional() {
        let raw = raw_from(json!({
            "id": "x",
            "pricingInfos": { "price": "5000", "businessType": "RENTAL", "monthlyCondoFee": "n/a" }
        }));
        let listing = Listing::from_raw(raw).unwrap();
        assert_eq!(listing.pricing_infos.monthly_condo_fee, None);
        assert_eq!(listing.business_type(), BusinessType::Rental);
    }

    #[test]
    fn test_unknown_business_type() {
        let raw = raw_from(json!({
            "id": "x",
            "pricingInfos": { "price": "5000", "businessType": "LEASE" }
        }));
        let listing = Listing::from_raw(raw).unwrap();
        assert_eq!(listing.business_type(), BusinessType::Unknown);
    }

    #[test]
    fn test_missing_location_defaults_to_unset() {
        let raw = raw_from(json!({ "id": "x", "pricingInfos": { "price": "1" } }));
        let listing = Listing::from_raw(raw).unwrap();
        assert!(listing.location().is_unset());
    }

    #[test]
    fn test_page_result_field_names() {
        let page = PageResult {
            listings: vec![],
            page_number: 2,
            page_size: 0,
            total_count: 25,
        };
        let body = serde_json::to_value(&page).unwrap();
        assert_eq!(
            body,
            json!({ "listings": [], "pageNumber": 2, "pageSize": 0, "propertiestotalCount": 25 })
        );
    }
}
