use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CampaignStatus, IndicatorType};
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub county_id: Uuid,
    pub program_manager_id: Option<Uuid>,
    pub budget: Option<f64>,
    pub is_active: bool,
}

/// Monitoring and evaluation indicator attached to a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: Uuid,
    pub program_id: Uuid,
    pub name: String,
    pub code: String,
    pub indicator_type: IndicatorType,
    pub definition: String,
    pub numerator_definition: String,
    pub denominator_definition: Option<String>,
    pub calculation_method: String,
    pub target_value: Option<f64>,
    pub baseline_value: Option<f64>,
    /// Monthly, Quarterly or Annual.
    pub reporting_frequency: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub id: Uuid,
    pub facility_id: Option<Uuid>,
    pub subcounty_id: Option<Uuid>,
    pub year: i32,
    pub month: u32,
    pub outpatient_visits: i32,
    pub inpatient_admissions: i32,
    pub anc_visits: i32,
    pub deliveries: i32,
    pub immunizations_given: i32,
    pub malaria_cases: i32,
    pub tb_cases: i32,
    pub hiv_tests: i32,
    /// Indicator code to reported value.
    pub indicators: BTreeMap<String, f64>,
    pub submitted_by_id: Option<Uuid>,
    pub submission_date: NaiveDateTime,
    pub approved: bool,
    pub approved_by_id: Option<Uuid>,
    pub approval_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub program_id: Uuid,
    pub name: String,
    pub campaign_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_area: String,
    pub ward_ids: Vec<Uuid>,
    pub target_population: i32,
    pub people_reached: i32,
    pub objectives: String,
    pub activities: Vec<String>,
    pub budget: f64,
    pub actual_expenditure: f64,
    pub campaign_manager_id: Option<Uuid>,
    pub status: CampaignStatus,
    pub final_report: Option<String>,
}

impl Validate for Program {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("program.name", &self.name)?;
        validate_not_blank("program.code", &self.code)
    }
}

impl Validate for Indicator {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("indicator.code", &self.code)?;
        validate_not_blank("indicator.definition", &self.definition)
    }
}

impl Validate for MonthlyReport {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_range("monthly_report.month", f64::from(self.month), 1.0, 12.0)?;
        validate_min("monthly_report.year", self.year.into(), 2000)?;
        for (field, value) in [
            ("monthly_report.outpatient_visits", self.outpatient_visits),
            ("monthly_report.inpatient_admissions", self.inpatient_admissions),
            ("monthly_report.anc_visits", self.anc_visits),
            ("monthly_report.deliveries", self.deliveries),
            ("monthly_report.immunizations_given", self.immunizations_given),
        ] {
            validate_min(field, value.into(), 0)?;
        }
        Ok(())
    }
}

impl Validate for Campaign {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("campaign.name", &self.name)?;
        validate_min("campaign.target_population", self.target_population.into(), 0)?;
        validate_min("campaign.people_reached", self.people_reached.into(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(month: u32) -> MonthlyReport {
        MonthlyReport {
            id: Uuid::new_v4(),
            facility_id: None,
            subcounty_id: None,
            year: 2024,
            month,
            outpatient_visits: 0,
            inpatient_admissions: 0,
            anc_visits: 0,
            deliveries: 0,
            immunizations_given: 0,
            malaria_cases: 0,
            tb_cases: 0,
            hiv_tests: 0,
            indicators: BTreeMap::new(),
            submitted_by_id: None,
            submission_date: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            approved: false,
            approved_by_id: None,
            approval_date: None,
            notes: None,
        }
    }

    #[test]
    fn month_must_be_calendar_month() {
        assert!(report(1).validate().is_ok());
        assert!(report(12).validate().is_ok());
        assert!(report(0).validate().is_err());
        assert!(report(13).validate().is_err());
    }
}
