//! Repository layer: entity-scoped database operations.
//!
//! Every `insert_*` validates the entity before touching SQLite, so field
//! rules fail as `DatabaseError::Validation` and storage rules fail as
//! `DatabaseError::ConstraintViolation`.

mod access;
mod activity;
mod dashboard;
mod facility;
mod geography;
mod household;
mod lab;
mod maternal;
mod programs;
mod referral;
mod staff;
mod supply;
mod surveillance;

use std::str::FromStr;

use rusqlite::types::{ToSql, Type};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::DatabaseError;

pub use access::*;
pub use activity::*;
pub use dashboard::*;
pub use facility::*;
pub use geography::*;
pub use household::*;
pub use lab::*;
pub use maternal::*;
pub use programs::*;
pub use referral::*;
pub use staff::*;
pub use supply::*;
pub use surveillance::*;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn enum_col<E>(row: &Row<'_>, idx: usize) -> rusqlite::Result<E>
where
    E: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(idx)?;
    E::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn json_col<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DatabaseError> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn opt_id(id: Option<Uuid>) -> Option<String> {
    id.map(|u| u.to_string())
}

/// Collects `AND ...` clauses with positional parameters for list queries.
#[derive(Default)]
pub(crate) struct FilterQuery {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl FilterQuery {
    pub(crate) fn eq<T: ToSql + 'static>(&mut self, column: &str, value: T) {
        self.params.push(Box::new(value));
        self.clauses
            .push(format!(" AND {column} = ?{}", self.params.len()));
    }

    /// Case-insensitive substring match against any of `columns`.
    pub(crate) fn search(&mut self, columns: &[&str], term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.params.push(Box::new(format!("%{term}%")));
        let p = self.params.len();
        let any = columns
            .iter()
            .map(|c| format!("{c} LIKE ?{p} COLLATE NOCASE"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.clauses.push(format!(" AND ({any})"));
    }

    /// Clause with one parameter, written as `{}` in `template`.
    pub(crate) fn with_param<T: ToSql + 'static>(&mut self, template: &str, value: T) {
        self.params.push(Box::new(value));
        let placeholder = format!("?{}", self.params.len());
        self.clauses
            .push(format!(" AND {}", template.replace("{}", &placeholder)));
    }

    pub(crate) fn raw(&mut self, clause: &str) {
        self.clauses.push(format!(" AND {clause}"));
    }

    pub(crate) fn sql_suffix(&self) -> String {
        self.clauses.join("")
    }

    pub(crate) fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal parent rows shared by repository tests.

    use chrono::NaiveDate;
    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::db::*;
    use crate::models::enums::*;
    use crate::models::*;

    pub struct Geo {
        pub county: Uuid,
        pub subcounty: Uuid,
        pub ward: Uuid,
    }

    pub fn geo(conn: &Connection) -> Geo {
        let county = County {
            id: Uuid::new_v4(),
            name: "Wajir".into(),
            code: "WJR".into(),
            population: Some(781_263),
            contact_person: None,
            phone: None,
            email: None,
        };
        insert_county(conn, &county).unwrap();
        let subcounty = SubCounty {
            id: Uuid::new_v4(),
            county_id: county.id,
            name: "Eldas".into(),
            code: "WJR-EL".into(),
            population: None,
        };
        insert_subcounty(conn, &subcounty).unwrap();
        let ward = Ward {
            id: Uuid::new_v4(),
            subcounty_id: subcounty.id,
            name: "Della".into(),
            code: "WJR-EL-W01".into(),
            population: None,
        };
        insert_ward(conn, &ward).unwrap();
        Geo {
            county: county.id,
            subcounty: subcounty.id,
            ward: ward.id,
        }
    }

    pub fn facility(conn: &Connection, geo: &Geo, code: &str, facility_type: FacilityType) -> Uuid {
        let f = Facility {
            id: Uuid::new_v4(),
            name: format!("{code} Facility"),
            facility_code: code.into(),
            facility_type,
            ward_id: geo.ward,
            subcounty_id: geo.subcounty,
            latitude: None,
            longitude: None,
            phone: None,
            email: None,
            physical_address: None,
            is_operational: true,
            bed_capacity: Some(10),
        };
        insert_facility(conn, &f).unwrap();
        f.id
    }

    pub fn user(conn: &Connection, n: u32) -> Uuid {
        let u = User {
            id: Uuid::new_v4(),
            email: format!("user{n}@wajir.health.go.ke"),
            phone: format!("+254720{n:06}"),
            first_name: "Abdi".into(),
            last_name: "Ali".into(),
            national_id: None,
            county_id: None,
            subcounty_id: None,
            password_hash: "x".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
        };
        insert_user(conn, &u).unwrap();
        u.id
    }

    pub fn household(conn: &Connection, geo: &Geo, number: &str) -> Uuid {
        let unit = CommunityUnit {
            id: Uuid::new_v4(),
            name: format!("{number} CHU"),
            code: format!("CHU-{number}"),
            ward_id: geo.ward,
            linked_facility_id: None,
            target_population: 3000,
            target_households: Some(500),
            is_active: true,
            established_date: None,
        };
        insert_community_unit(conn, &unit).unwrap();
        let h = Household {
            id: Uuid::new_v4(),
            household_number: number.into(),
            community_unit_id: unit.id,
            ward_id: geo.ward,
            assigned_chv_id: None,
            village: Some("Central Della".into()),
            physical_address: None,
            latitude: None,
            longitude: None,
            number_of_members: 3,
            has_toilet: None,
            water_source: None,
            registration_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            is_active: true,
        };
        insert_household(conn, &h).unwrap();
        h.id
    }

    pub fn person(conn: &Connection, household_id: Uuid, first: &str, gender: Gender, dob: NaiveDate) -> Uuid {
        let p = Person {
            id: Uuid::new_v4(),
            first_name: first.into(),
            middle_name: None,
            last_name: "Hassan".into(),
            date_of_birth: dob,
            gender,
            national_id: None,
            nhif_number: None,
            birth_certificate_number: None,
            phone: None,
            alternate_phone: None,
            household_id,
            is_household_head: false,
            blood_group: None,
            chronic_conditions: vec![],
            allergies: None,
            is_alive: true,
            date_of_death: None,
        };
        insert_person(conn, &p).unwrap();
        p.id
    }
}
