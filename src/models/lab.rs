use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LabOrderStatus;
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTestOrder {
    pub id: Uuid,
    pub order_number: String,
    pub patient_id: Uuid,
    pub facility_id: Uuid,
    pub ordered_by_id: Option<Uuid>,
    pub order_date: NaiveDateTime,
    pub tests_requested: Vec<String>,
    pub clinical_notes: Option<String>,
    pub priority: String,
    pub status: LabOrderStatus,
    pub sample_collected_by_id: Option<Uuid>,
    pub sample_collection_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub id: Uuid,
    pub lab_order_id: Uuid,
    pub test_name: String,
    pub test_code: Option<String>,
    pub result_value: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Normal, Abnormal or Critical.
    pub result_status: String,
    pub tested_by_id: Option<Uuid>,
    pub test_date: NaiveDateTime,
    pub verified_by_id: Option<Uuid>,
    pub verification_date: Option<NaiveDateTime>,
    pub attachments: Vec<String>,
    pub notes: Option<String>,
}

impl Validate for LabTestOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("lab_order.order_number", &self.order_number)?;
        if self.tests_requested.is_empty() {
            return Err(ValidationError::Blank {
                field: "lab_order.tests_requested",
            });
        }
        Ok(())
    }
}

impl Validate for LabResult {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("lab_result.test_name", &self.test_name)?;
        validate_not_blank("lab_result.result_value", &self.result_value)
    }
}
