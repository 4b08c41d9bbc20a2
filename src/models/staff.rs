use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Cadre;
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cadre: Cadre,
    pub employee_number: String,
    pub qualification: String,
    pub institution: Option<String>,
    pub graduation_year: Option<i32>,
    pub license_number: Option<String>,
    pub licensing_body: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub years_of_experience: i32,
    pub primary_facility_id: Option<Uuid>,
    pub employment_date: NaiveDate,
    pub employment_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    pub id: Uuid,
    pub course_name: String,
    pub course_code: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
    pub trainer: String,
    pub training_organization: Option<String>,
    pub objectives: String,
    pub content_summary: Option<String>,
    pub budget: Option<f64>,
    pub organized_by_id: Option<Uuid>,
}

/// Join row between a training and an attending staff profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingAttendance {
    pub id: Uuid,
    pub training_id: Uuid,
    pub staff_id: Uuid,
    pub attended: bool,
    pub attendance_percentage: f64,
    pub pre_test_score: Option<f64>,
    pub post_test_score: Option<f64>,
    pub certificate_issued: bool,
    pub certificate_number: Option<String>,
    pub feedback: Option<String>,
}

impl Validate for StaffProfile {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("staff_profile.employee_number", &self.employee_number)?;
        validate_min(
            "staff_profile.years_of_experience",
            self.years_of_experience.into(),
            0,
        )
    }
}

impl Validate for Training {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("training.course_name", &self.course_name)?;
        if self.end_date < self.start_date {
            return Err(ValidationError::BelowMinimum {
                field: "training.end_date",
                min: 0,
                value: (self.end_date - self.start_date).num_days(),
            });
        }
        Ok(())
    }
}

impl Validate for TrainingAttendance {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_range(
            "training_attendance.attendance_percentage",
            self.attendance_percentage,
            0.0,
            100.0,
        )?;
        for (field, score) in [
            ("training_attendance.pre_test_score", self.pre_test_score),
            ("training_attendance.post_test_score", self.post_test_score),
        ] {
            if let Some(s) = score {
                validate_range(field, s, 0.0, 100.0)?;
            }
        }
        Ok(())
    }
}
