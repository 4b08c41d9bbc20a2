use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DeathCategory, SurveillanceSource};
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveillanceReport {
    pub id: Uuid,
    pub report_number: String,
    pub disease_name: String,
    /// ICD code.
    pub disease_code: Option<String>,
    pub report_date: NaiveDate,
    pub reporting_period_start: NaiveDate,
    pub reporting_period_end: NaiveDate,
    pub ward_id: Uuid,
    pub facility_id: Option<Uuid>,
    pub source: SurveillanceSource,
    pub reported_by_id: Option<Uuid>,
    pub cases_suspected: i32,
    pub cases_confirmed: i32,
    pub deaths: i32,
    pub cases_under_5: i32,
    pub cases_5_to_15: i32,
    pub cases_over_15: i32,
    pub males: i32,
    pub females: i32,
    pub outbreak_declared: bool,
    pub response_initiated: bool,
    pub response_details: Option<String>,
    pub attachments: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityReport {
    pub id: Uuid,
    pub deceased_person_id: Option<Uuid>,
    pub death_category: DeathCategory,
    pub date_of_death: NaiveDate,
    /// Home, Facility or Transit.
    pub place_of_death: String,
    pub facility_id: Option<Uuid>,
    pub ward_id: Uuid,
    pub immediate_cause: String,
    pub underlying_cause: Option<String>,
    pub contributing_factors: Option<String>,
    pub pregnancy_related: bool,
    pub timing: Option<String>,
    pub reported_by_id: Option<Uuid>,
    pub report_date: NaiveDate,
    pub autopsy_done: bool,
    pub autopsy_findings: Option<String>,
    pub death_certificate_issued: bool,
    pub notes: Option<String>,
}

impl Validate for SurveillanceReport {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("surveillance.report_number", &self.report_number)?;
        for (field, value) in [
            ("surveillance.cases_suspected", self.cases_suspected),
            ("surveillance.cases_confirmed", self.cases_confirmed),
            ("surveillance.deaths", self.deaths),
            ("surveillance.males", self.males),
            ("surveillance.females", self.females),
        ] {
            validate_min(field, value.into(), 0)?;
        }
        Ok(())
    }
}

impl Validate for MortalityReport {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("mortality.immediate_cause", &self.immediate_cause)?;
        validate_not_blank("mortality.place_of_death", &self.place_of_death)
    }
}
