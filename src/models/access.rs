use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RoleName;
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: RoleName,
    pub description: Option<String>,
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub national_id: Option<String>,
    pub county_id: Option<Uuid>,
    pub subcounty_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<NaiveDateTime>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Validate for Role {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_range("role.level", f64::from(self.level), 1.0, 10.0)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email("user.email", &self.email)?;
        validate_phone("user.phone", &self.phone)?;
        validate_not_blank("user.first_name", &self.first_name)?;
        validate_not_blank("user.last_name", &self.last_name)
    }
}
