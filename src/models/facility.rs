use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{FacilityType, Gender};
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub facility_code: String,
    pub facility_type: FacilityType,
    pub ward_id: Uuid,
    pub subcounty_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub physical_address: Option<String>,
    pub is_operational: bool,
    pub bed_capacity: Option<i32>,
}

/// Community Health Unit: the catchment grouping of households.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityUnit {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub ward_id: Uuid,
    pub linked_facility_id: Option<Uuid>,
    pub target_population: i32,
    pub target_households: Option<i32>,
    pub is_active: bool,
    pub established_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityHealthVolunteer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub community_unit_id: Uuid,
    pub national_id: String,
    pub chv_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub training_date: Option<NaiveDate>,
    pub certification_date: Option<NaiveDate>,
    pub certification_expiry: Option<NaiveDate>,
    pub is_active: bool,
    pub households_assigned: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    NotCertified,
    Expired,
    Valid,
}

impl CommunityHealthVolunteer {
    pub fn certification_status(&self, today: NaiveDate) -> CertificationStatus {
        if self.certification_date.is_none() {
            return CertificationStatus::NotCertified;
        }
        match self.certification_expiry {
            Some(expiry) if expiry < today => CertificationStatus::Expired,
            _ => CertificationStatus::Valid,
        }
    }
}

impl Validate for Facility {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("facility.name", &self.name)?;
        validate_not_blank("facility.facility_code", &self.facility_code)?;
        validate_optional_phone("facility.phone", self.phone.as_deref())?;
        validate_optional_email("facility.email", self.email.as_deref())?;
        if let Some(beds) = self.bed_capacity {
            validate_min("facility.bed_capacity", beds.into(), 0)?;
        }
        Ok(())
    }
}

impl Validate for CommunityUnit {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("community_unit.code", &self.code)?;
        validate_min(
            "community_unit.target_population",
            self.target_population.into(),
            0,
        )
    }
}

impl Validate for CommunityHealthVolunteer {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("chv.national_id", &self.national_id)?;
        validate_min(
            "chv.households_assigned",
            self.households_assigned.into(),
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chv(certified: Option<NaiveDate>, expiry: Option<NaiveDate>) -> CommunityHealthVolunteer {
        CommunityHealthVolunteer {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            community_unit_id: Uuid::new_v4(),
            national_id: "67890001".into(),
            chv_number: "CHV00001".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            training_date: None,
            certification_date: certified,
            certification_expiry: expiry,
            is_active: true,
            households_assigned: 25,
        }
    }

    #[test]
    fn certification_status_transitions() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let cert = NaiveDate::from_ymd_opt(2020, 3, 1);

        assert_eq!(chv(None, None).certification_status(today), CertificationStatus::NotCertified);
        assert_eq!(chv(cert, None).certification_status(today), CertificationStatus::Valid);
        assert_eq!(
            chv(cert, NaiveDate::from_ymd_opt(2024, 5, 31)).certification_status(today),
            CertificationStatus::Expired
        );
        assert_eq!(
            chv(cert, Some(today)).certification_status(today),
            CertificationStatus::Valid
        );
    }
}
