use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyRecord {
    pub id: Uuid,
    pub woman_id: Uuid,
    pub lmp_date: NaiveDate,
    pub edd: NaiveDate,
    pub gravida: i32,
    pub parity: i32,
    pub risk_factors: Vec<String>,
    pub is_high_risk: bool,
    pub anc_visits_completed: i32,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_outcome: Option<String>,
    pub delivery_facility_id: Option<Uuid>,
    pub is_active: bool,
    pub notes: Option<String>,
}

/// Antenatal care visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncVisit {
    pub id: Uuid,
    pub pregnancy_id: Uuid,
    pub visit_number: i32,
    pub visit_date: NaiveDate,
    pub gestation_weeks: i32,
    pub facility_id: Option<Uuid>,
    pub attended_by_id: Option<Uuid>,
    pub weight: Option<f64>,
    pub blood_pressure: Option<String>,
    pub hemoglobin: Option<f64>,
    pub tests_done: Vec<String>,
    pub supplements_given: Vec<String>,
    pub next_visit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Postnatal care visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PncVisit {
    pub id: Uuid,
    pub pregnancy_id: Uuid,
    pub visit_number: i32,
    pub visit_date: NaiveDate,
    pub days_postpartum: i32,
    pub facility_id: Option<Uuid>,
    pub attended_by_id: Option<Uuid>,
    pub mother_condition: Option<String>,
    pub baby_condition: Option<String>,
    pub breastfeeding_well: bool,
    pub family_planning_counselled: bool,
    pub next_visit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmunizationRecord {
    pub id: Uuid,
    pub child_id: Uuid,
    pub vaccine_name: String,
    pub vaccine_code: String,
    pub dose_number: i32,
    pub administration_date: NaiveDate,
    pub administered_by_id: Option<Uuid>,
    pub facility_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub site: Option<String>,
    pub adverse_reaction: Option<String>,
    pub next_dose_date: Option<NaiveDate>,
}

impl Validate for PregnancyRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_min("pregnancy.gravida", self.gravida.into(), 0)?;
        validate_min("pregnancy.parity", self.parity.into(), 0)?;
        validate_min(
            "pregnancy.anc_visits_completed",
            self.anc_visits_completed.into(),
            0,
        )
    }
}

impl Validate for AncVisit {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_min("anc_visit.visit_number", self.visit_number.into(), 1)?;
        validate_min("anc_visit.gestation_weeks", self.gestation_weeks.into(), 0)
    }
}

impl Validate for PncVisit {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_min("pnc_visit.visit_number", self.visit_number.into(), 1)?;
        validate_min("pnc_visit.days_postpartum", self.days_postpartum.into(), 0)
    }
}

impl Validate for ImmunizationRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("immunization.vaccine_code", &self.vaccine_code)?;
        validate_min("immunization.dose_number", self.dose_number.into(), 1)
    }
}
