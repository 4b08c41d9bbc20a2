use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{OutreachEventType, ScreeningResult, ScreeningType, VisitType};
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdVisit {
    pub id: Uuid,
    pub household_id: Uuid,
    pub chv_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    pub visit_type: VisitType,
    pub members_present: i32,
    pub services_provided: Vec<String>,
    pub findings: Option<String>,
    pub action_taken: Option<String>,
    pub referrals_made: i32,
    pub next_visit_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachEvent {
    pub id: Uuid,
    pub name: String,
    pub event_type: OutreachEventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub ward_id: Uuid,
    pub target_population: i32,
    pub people_reached: i32,
    pub organizing_facility_id: Option<Uuid>,
    pub partners: Option<String>,
    pub services_offered: Vec<String>,
    /// Commodity code to quantity consumed.
    pub commodities_used: BTreeMap<String, i64>,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub report: Option<String>,
}

impl OutreachEvent {
    /// Share of the target population reached, 0.0 when there is no target.
    pub fn coverage(&self) -> f64 {
        if self.target_population <= 0 {
            return 0.0;
        }
        f64::from(self.people_reached) / f64::from(self.target_population)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub id: Uuid,
    pub person_id: Uuid,
    pub screening_type: ScreeningType,
    pub screening_date: NaiveDate,
    pub screened_by_id: Option<Uuid>,
    pub facility_id: Option<Uuid>,
    pub outreach_event_id: Option<Uuid>,
    pub result: ScreeningResult,
    pub result_details: BTreeMap<String, String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Validate for HouseholdVisit {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_min("household_visit.members_present", self.members_present.into(), 0)?;
        validate_min("household_visit.referrals_made", self.referrals_made.into(), 0)
    }
}

impl Validate for OutreachEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("outreach_event.name", &self.name)?;
        validate_min("outreach_event.target_population", self.target_population.into(), 0)?;
        validate_min("outreach_event.people_reached", self.people_reached.into(), 0)
    }
}

impl Validate for Screening {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.follow_up_required && self.follow_up_date.is_none() {
            return Err(ValidationError::Blank {
                field: "screening.follow_up_date",
            });
        }
        Ok(())
    }
}
