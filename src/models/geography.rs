use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct County {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub population: Option<i64>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCounty {
    pub id: Uuid,
    pub county_id: Uuid,
    pub name: String,
    pub code: String,
    pub population: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ward {
    pub id: Uuid,
    pub subcounty_id: Uuid,
    pub name: String,
    pub code: String,
    pub population: Option<i64>,
}

impl Validate for County {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("county.name", &self.name)?;
        validate_not_blank("county.code", &self.code)?;
        validate_optional_phone("county.phone", self.phone.as_deref())?;
        validate_optional_email("county.email", self.email.as_deref())
    }
}

impl Validate for SubCounty {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("subcounty.name", &self.name)?;
        validate_not_blank("subcounty.code", &self.code)
    }
}

impl Validate for Ward {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("ward.name", &self.name)?;
        validate_not_blank("ward.code", &self.code)
    }
}
