use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Gender;
use super::validation::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: Uuid,
    pub household_number: String,
    pub community_unit_id: Uuid,
    pub ward_id: Uuid,
    pub assigned_chv_id: Option<Uuid>,
    pub village: Option<String>,
    pub physical_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub number_of_members: i32,
    pub has_toilet: Option<bool>,
    pub water_source: Option<String>,
    pub registration_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub national_id: Option<String>,
    pub nhif_number: Option<String>,
    pub birth_certificate_number: Option<String>,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub household_id: Uuid,
    pub is_household_head: bool,
    pub blood_group: Option<String>,
    pub chronic_conditions: Vec<String>,
    pub allergies: Option<String>,
    pub is_alive: bool,
    pub date_of_death: Option<NaiveDate>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Completed years of age on the given date.
    pub fn age_on(&self, date: NaiveDate) -> i32 {
        let dob = self.date_of_birth;
        let mut age = date.year() - dob.year();
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        age
    }

    /// Fractional age in years on the given date.
    pub fn age_years_at(&self, date: NaiveDate) -> f64 {
        (date - self.date_of_birth).num_days() as f64 / 365.25
    }

    /// Completed weeks of age on the given date.
    pub fn age_weeks_on(&self, date: NaiveDate) -> i64 {
        (date - self.date_of_birth).num_weeks()
    }
}

impl Validate for Household {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("household.household_number", &self.household_number)?;
        validate_min(
            "household.number_of_members",
            self.number_of_members.into(),
            1,
        )
    }
}

impl Validate for Person {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("person.first_name", &self.first_name)?;
        validate_not_blank("person.last_name", &self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_born(dob: NaiveDate) -> Person {
        Person {
            id: Uuid::new_v4(),
            first_name: "Amina".into(),
            middle_name: None,
            last_name: "Hassan".into(),
            date_of_birth: dob,
            gender: Gender::Female,
            national_id: None,
            nhif_number: None,
            birth_certificate_number: None,
            phone: None,
            alternate_phone: None,
            household_id: Uuid::new_v4(),
            is_household_head: false,
            blood_group: None,
            chronic_conditions: vec![],
            allergies: None,
            is_alive: true,
            date_of_death: None,
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let p = person_born(NaiveDate::from_ymd_opt(2000, 6, 15).unwrap());
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), 23);
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), 24);
    }

    #[test]
    fn age_in_weeks() {
        let p = person_born(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(p.age_weeks_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()), 2);
        assert_eq!(p.age_weeks_on(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()), 2);
    }

    #[test]
    fn household_requires_a_member() {
        let hh = Household {
            id: Uuid::new_v4(),
            household_number: "WJR-HH000001".into(),
            community_unit_id: Uuid::new_v4(),
            ward_id: Uuid::new_v4(),
            assigned_chv_id: None,
            village: None,
            physical_address: None,
            latitude: None,
            longitude: None,
            number_of_members: 0,
            has_toilet: None,
            water_source: None,
            registration_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            is_active: true,
        };
        assert!(hh.validate().is_err());
    }
}
