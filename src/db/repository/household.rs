use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col, FilterQuery};
use crate::db::DatabaseError;
use crate::models::*;

const HOUSEHOLD_COLUMNS: &str = "id, household_number, community_unit_id, ward_id,
    assigned_chv_id, village, physical_address, latitude, longitude, number_of_members,
    has_toilet, water_source, registration_date, is_active";

const PERSON_COLUMNS: &str = "id, first_name, middle_name, last_name, date_of_birth, gender,
    national_id, nhif_number, birth_certificate_number, phone, alternate_phone, household_id,
    is_household_head, blood_group, chronic_conditions, allergies, is_alive, date_of_death";

pub fn insert_household(conn: &Connection, household: &Household) -> Result<(), DatabaseError> {
    household.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO households ({HOUSEHOLD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            household.id.to_string(),
            household.household_number,
            household.community_unit_id.to_string(),
            household.ward_id.to_string(),
            opt_id(household.assigned_chv_id),
            household.village,
            household.physical_address,
            household.latitude,
            household.longitude,
            household.number_of_members,
            household.has_toilet,
            household.water_source,
            household.registration_date,
            household.is_active,
        ],
    )?;
    Ok(())
}

fn household_from_row(row: &Row<'_>) -> rusqlite::Result<Household> {
    Ok(Household {
        id: uuid_col(row, 0)?,
        household_number: row.get(1)?,
        community_unit_id: uuid_col(row, 2)?,
        ward_id: uuid_col(row, 3)?,
        assigned_chv_id: opt_uuid_col(row, 4)?,
        village: row.get(5)?,
        physical_address: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        number_of_members: row.get(9)?,
        has_toilet: row.get(10)?,
        water_source: row.get(11)?,
        registration_date: row.get(12)?,
        is_active: row.get(13)?,
    })
}

pub fn get_household(conn: &Connection, id: &Uuid) -> Result<Option<Household>, DatabaseError> {
    let household = conn
        .query_row(
            &format!("SELECT {HOUSEHOLD_COLUMNS} FROM households WHERE id = ?1"),
            [id.to_string()],
            household_from_row,
        )
        .optional()?;
    Ok(household)
}

pub fn list_households(
    conn: &Connection,
    filter: &HouseholdFilter,
) -> Result<Vec<Household>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(id) = filter.ward_id {
        q.eq("ward_id", id.to_string());
    }
    if let Some(id) = filter.community_unit_id {
        q.eq("community_unit_id", id.to_string());
    }
    if filter.active_only {
        q.raw("is_active = 1");
    }
    if let Some(term) = &filter.search {
        q.search(&["household_number", "village"], term);
    }
    let sql = format!(
        "SELECT {HOUSEHOLD_COLUMNS} FROM households WHERE 1=1{} ORDER BY household_number",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), household_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_person(conn: &Connection, person: &Person) -> Result<(), DatabaseError> {
    person.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO persons ({PERSON_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            person.id.to_string(),
            person.first_name,
            person.middle_name,
            person.last_name,
            person.date_of_birth,
            person.gender.as_str(),
            person.national_id,
            person.nhif_number,
            person.birth_certificate_number,
            person.phone,
            person.alternate_phone,
            person.household_id.to_string(),
            person.is_household_head,
            person.blood_group,
            to_json(&person.chronic_conditions)?,
            person.allergies,
            person.is_alive,
            person.date_of_death,
        ],
    )?;
    Ok(())
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: uuid_col(row, 0)?,
        first_name: row.get(1)?,
        middle_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        gender: enum_col(row, 5)?,
        national_id: row.get(6)?,
        nhif_number: row.get(7)?,
        birth_certificate_number: row.get(8)?,
        phone: row.get(9)?,
        alternate_phone: row.get(10)?,
        household_id: uuid_col(row, 11)?,
        is_household_head: row.get(12)?,
        blood_group: row.get(13)?,
        chronic_conditions: json_col(row, 14)?,
        allergies: row.get(15)?,
        is_alive: row.get(16)?,
        date_of_death: row.get(17)?,
    })
}

pub fn get_person(conn: &Connection, id: &Uuid) -> Result<Option<Person>, DatabaseError> {
    let person = conn
        .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            [id.to_string()],
            person_from_row,
        )
        .optional()?;
    Ok(person)
}

pub fn list_persons(conn: &Connection, filter: &PersonFilter) -> Result<Vec<Person>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(id) = filter.household_id {
        q.eq("household_id", id.to_string());
    }
    if let Some(g) = filter.gender {
        q.eq("gender", g.as_str());
    }
    if filter.alive_only {
        q.raw("is_alive = 1");
    }
    if let Some(term) = &filter.search {
        q.search(&["first_name", "middle_name", "last_name", "national_id"], term);
    }
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM persons WHERE 1=1{} ORDER BY last_name, first_name",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), person_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Record a death on the person row.
pub fn mark_person_deceased(
    conn: &Connection,
    person_id: &Uuid,
    date_of_death: NaiveDate,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE persons SET is_alive = 0, date_of_death = ?2 WHERE id = ?1",
        params![person_id.to_string(), date_of_death],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Person".into(),
            id: person_id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{open_memory_database, ConstraintKind};
    use crate::models::enums::Gender;

    fn dob(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 6, 15).unwrap()
    }

    #[test]
    fn household_needs_at_least_one_member() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let existing = fixtures::household(&conn, &geo, "WJR-HH000001");
        let mut h = get_household(&conn, &existing).unwrap().unwrap();
        h.id = Uuid::new_v4();
        h.household_number = "WJR-HH000002".into();
        h.number_of_members = 0;
        assert!(matches!(
            insert_household(&conn, &h),
            Err(DatabaseError::Validation(_))
        ));
    }

    #[test]
    fn person_national_id_unique_when_present() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        // Two persons without national ids coexist.
        fixtures::person(&conn, hh, "Asha", Gender::Female, dob(2015));
        fixtures::person(&conn, hh, "Suad", Gender::Female, dob(2016));

        let mut adult = get_person(&conn, &fixtures::person(&conn, hh, "Omar", Gender::Male, dob(1980)))
            .unwrap()
            .unwrap();
        conn.execute(
            "UPDATE persons SET national_id = '78900001' WHERE id = ?1",
            [adult.id.to_string()],
        )
        .unwrap();
        adult.id = Uuid::new_v4();
        adult.national_id = Some("78900001".into());
        let err = insert_person(&conn, &adult).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn chronic_conditions_round_trip_as_json() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        let id = fixtures::person(&conn, hh, "Halima", Gender::Female, dob(1970));
        conn.execute(
            "UPDATE persons SET chronic_conditions = '[\"Diabetes\",\"Hypertension\"]' WHERE id = ?1",
            [id.to_string()],
        )
        .unwrap();
        let p = get_person(&conn, &id).unwrap().unwrap();
        assert_eq!(p.chronic_conditions, vec!["Diabetes", "Hypertension"]);
    }

    #[test]
    fn search_and_alive_filter() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        let fatuma = fixtures::person(&conn, hh, "Fatuma", Gender::Female, dob(1960));
        fixtures::person(&conn, hh, "Yusuf", Gender::Male, dob(1962));
        mark_person_deceased(&conn, &fatuma, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();

        let found = list_persons(
            &conn,
            &PersonFilter {
                search: Some("fatu".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_alive);

        let alive = list_persons(
            &conn,
            &PersonFilter {
                household_id: Some(hh),
                alive_only: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].first_name, "Yusuf");
    }

    #[test]
    fn death_before_birth_rejected() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        let id = fixtures::person(&conn, hh, "Ali", Gender::Male, dob(2000));
        let err = mark_person_deceased(&conn, &id, dob(1999)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn households_searchable_by_village() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        fixtures::household(&conn, &geo, "WJR-HH000001");
        let found = list_households(
            &conn,
            &HouseholdFilter {
                search: Some("central".into()),
                active_only: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
    }
}
