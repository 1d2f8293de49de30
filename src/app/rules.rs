//! Channel eligibility rules
//!
//! Each channel decides independently whether a listing belongs to its bucket
//! and may adjust the price of its own copy when the listing lies inside the
//! geofence. A listing can qualify for neither, one, or both channels.

use crate::app::clock::Clock;
use crate::app::geofence::GeoFence;
use crate::app::models::{BusinessType, Channel, Listing};
use crate::constants::rules;

/// Why a listing was left out of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Geolocation is (0, 0)
    MissingLocation,
    /// Failed the channel's price rules
    NotEligible,
}

/// Eligibility rules for both channels, sharing one geofence
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityRules {
    fence: GeoFence,
}

impl EligibilityRules {
    pub fn new(fence: GeoFence) -> Self {
        Self { fence }
    }

    /// Checks that apply to every channel
    pub fn precheck(&self, listing: &Listing) -> Result<(), Rejection> {
        if listing.location().is_unset() {
            return Err(Rejection::MissingLocation);
        }
        Ok(())
    }

    /// Whether the listing satisfies a channel's price rules
    pub fn is_eligible(&self, channel: Channel, listing: &Listing) -> bool {
        match channel {
            Channel::Zap => is_zap_eligible(listing),
            Channel::VivaReal => is_vivareal_eligible(listing),
        }
    }

    /// Produce the channel's copy of a listing, or say why it was left out
    ///
    /// The returned copy carries the channel's geofence price adjustment, if
    /// any; the input is never modified.
    pub fn apply(
        &self,
        channel: Channel,
        listing: &Listing,
        clock: &dyn Clock,
    ) -> Result<Listing, Rejection> {
        self.precheck(listing)?;
        if !self.is_eligible(channel, listing) {
            return Err(Rejection::NotEligible);
        }

        let mut copy = listing.clone();
        if let Some(factor) = self.adjustment(channel, listing) {
            copy.pricing_infos.price = listing.price() * factor;
            copy.updated_at = clock.now_rfc3339();
        }
        Ok(copy)
    }

    /// Price factor for a listing inside the geofence
    fn adjustment(&self, channel: Channel, listing: &Listing) -> Option<f64> {
        let factor = match (channel, listing.business_type()) {
            (Channel::Zap, BusinessType::Sale) => rules::ZAP_GEOFENCE_SALE_FACTOR,
            (Channel::VivaReal, BusinessType::Rental) => rules::VIVAREAL_GEOFENCE_RENTAL_FACTOR,
            _ => return None,
        };
        let location = listing.location();
        self.fence
            .contains(location.lat, location.lon)
            .then_some(factor)
    }
}

fn is_zap_eligible(listing: &Listing) -> bool {
    let price = listing.price();
    match listing.business_type() {
        BusinessType::Sale => price >= rules::ZAP_MIN_SALE_PRICE,
        BusinessType::Rental => {
            price >= rules::ZAP_MIN_RENTAL_PRICE && is_square_meter_acceptable(listing)
        }
        BusinessType::Unknown => false,
    }
}

/// Rental price per usable square meter; undefined (rejected) without area
fn is_square_meter_acceptable(listing: &Listing) -> bool {
    if listing.usable_areas <= 0 {
        return false;
    }
    listing.price() / listing.usable_areas as f64 > rules::ZAP_MIN_RENTAL_PRICE_PER_SQM
}

fn is_vivareal_eligible(listing: &Listing) -> bool {
    let price = listing.price();
    match listing.business_type() {
        BusinessType::Sale => price >= rules::VIVAREAL_MIN_SALE_PRICE,
        BusinessType::Rental => {
            price >= rules::VIVAREAL_MIN_RENTAL_PRICE && is_condo_fee_acceptable(listing)
        }
        BusinessType::Unknown => false,
    }
}

/// Condo fee must stay under 30% of the rent; an unknown fee passes
fn is_condo_fee_acceptable(listing: &Listing) -> bool {
    match listing.pricing_infos.monthly_condo_fee {
        Some(fee) => fee < listing.price() * rules::VIVAREAL_MAX_CONDO_FEE_RATIO,
        None => true,
    }
}
