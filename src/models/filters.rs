use uuid::Uuid;

use super::enums::{CommodityType, FacilityType, Gender, ReferralStatus, ReferralUrgency};
use super::supply::{ExpiryWindow, StockLevel};

#[derive(Debug, Default)]
pub struct FacilityFilter {
    pub facility_type: Option<FacilityType>,
    pub subcounty_id: Option<Uuid>,
    pub ward_id: Option<Uuid>,
    pub operational_only: bool,
    /// Matches name or facility code.
    pub search: Option<String>,
}

#[derive(Debug, Default)]
pub struct HouseholdFilter {
    pub ward_id: Option<Uuid>,
    pub community_unit_id: Option<Uuid>,
    pub active_only: bool,
    /// Matches household number or village.
    pub search: Option<String>,
}

#[derive(Debug, Default)]
pub struct PersonFilter {
    pub household_id: Option<Uuid>,
    pub gender: Option<Gender>,
    pub alive_only: bool,
    /// Matches first, middle or last name, or national id.
    pub search: Option<String>,
}

#[derive(Debug, Default)]
pub struct StockFilter {
    pub facility_id: Option<Uuid>,
    pub commodity_type: Option<CommodityType>,
    pub expiry: Option<ExpiryWindow>,
    pub level: Option<StockLevel>,
}

#[derive(Debug, Default)]
pub struct ReferralFilter {
    pub status: Option<ReferralStatus>,
    pub urgency: Option<ReferralUrgency>,
    pub to_facility_id: Option<Uuid>,
}
