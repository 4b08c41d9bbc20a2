use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ReferralStatus, ReferralUrgency};
use super::validation::*;

/// Inter-facility patient transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub referral_number: String,
    pub person_id: Uuid,
    pub from_facility_id: Option<Uuid>,
    pub to_facility_id: Option<Uuid>,
    pub referred_by_id: Option<Uuid>,
    pub referral_date: NaiveDateTime,
    pub urgency: ReferralUrgency,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment_given: Option<String>,
    pub status: ReferralStatus,
    pub accepted_by_id: Option<Uuid>,
    pub accepted_date: Option<NaiveDateTime>,
    pub arrival_date: Option<NaiveDateTime>,
    pub completion_date: Option<NaiveDateTime>,
    pub outcome: Option<String>,
    pub feedback_to_referring_facility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralFollowUp {
    pub id: Uuid,
    pub referral_id: Uuid,
    pub follow_up_date: NaiveDateTime,
    pub followed_up_by_id: Option<Uuid>,
    pub status_update: String,
    pub notes: Option<String>,
    pub action_taken: Option<String>,
}

impl Validate for Referral {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("referral.referral_number", &self.referral_number)?;
        validate_not_blank("referral.reason", &self.reason)
    }
}

impl Validate for ReferralFollowUp {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("referral_follow_up.status_update", &self.status_update)
    }
}
