use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, opt_id, opt_uuid_col, uuid_col, FilterQuery};
use crate::db::DatabaseError;
use crate::models::*;

const FACILITY_COLUMNS: &str = "id, name, facility_code, facility_type, ward_id, subcounty_id,
    latitude, longitude, phone, email, physical_address, is_operational, bed_capacity";

const CHV_COLUMNS: &str = "id, user_id, community_unit_id, national_id, chv_number,
    date_of_birth, gender, training_date, certification_date, certification_expiry,
    is_active, households_assigned";

pub fn insert_facility(conn: &Connection, facility: &Facility) -> Result<(), DatabaseError> {
    facility.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO facilities ({FACILITY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            facility.id.to_string(),
            facility.name,
            facility.facility_code,
            facility.facility_type.as_str(),
            facility.ward_id.to_string(),
            facility.subcounty_id.to_string(),
            facility.latitude,
            facility.longitude,
            facility.phone,
            facility.email,
            facility.physical_address,
            facility.is_operational,
            facility.bed_capacity,
        ],
    )?;
    Ok(())
}

fn facility_from_row(row: &Row<'_>) -> rusqlite::Result<Facility> {
    Ok(Facility {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        facility_code: row.get(2)?,
        facility_type: enum_col(row, 3)?,
        ward_id: uuid_col(row, 4)?,
        subcounty_id: uuid_col(row, 5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        phone: row.get(8)?,
        email: row.get(9)?,
        physical_address: row.get(10)?,
        is_operational: row.get(11)?,
        bed_capacity: row.get(12)?,
    })
}

pub fn get_facility(conn: &Connection, id: &Uuid) -> Result<Option<Facility>, DatabaseError> {
    let facility = conn
        .query_row(
            &format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = ?1"),
            [id.to_string()],
            facility_from_row,
        )
        .optional()?;
    Ok(facility)
}

pub fn list_facilities(
    conn: &Connection,
    filter: &FacilityFilter,
) -> Result<Vec<Facility>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(t) = filter.facility_type {
        q.eq("facility_type", t.as_str());
    }
    if let Some(id) = filter.subcounty_id {
        q.eq("subcounty_id", id.to_string());
    }
    if let Some(id) = filter.ward_id {
        q.eq("ward_id", id.to_string());
    }
    if filter.operational_only {
        q.raw("is_operational = 1");
    }
    if let Some(term) = &filter.search {
        q.search(&["name", "facility_code"], term);
    }

    let sql = format!(
        "SELECT {FACILITY_COLUMNS} FROM facilities WHERE 1=1{} ORDER BY facility_code",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), facility_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Bulk toggle used by the "mark operational / non-operational" actions.
pub fn set_facilities_operational(
    conn: &Connection,
    ids: &[Uuid],
    operational: bool,
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare("UPDATE facilities SET is_operational = ?1 WHERE id = ?2")?;
    let mut updated = 0;
    for id in ids {
        updated += stmt.execute(params![operational, id.to_string()])?;
    }
    tracing::info!(updated, operational, "Facility status updated");
    Ok(updated)
}

pub fn insert_community_unit(conn: &Connection, unit: &CommunityUnit) -> Result<(), DatabaseError> {
    unit.validate()?;
    conn.execute(
        "INSERT INTO community_units (id, name, code, ward_id, linked_facility_id,
         target_population, target_households, is_active, established_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            unit.id.to_string(),
            unit.name,
            unit.code,
            unit.ward_id.to_string(),
            opt_id(unit.linked_facility_id),
            unit.target_population,
            unit.target_households,
            unit.is_active,
            unit.established_date,
        ],
    )?;
    Ok(())
}

pub fn get_community_unit(conn: &Connection, id: &Uuid) -> Result<Option<CommunityUnit>, DatabaseError> {
    let unit = conn
        .query_row(
            "SELECT id, name, code, ward_id, linked_facility_id, target_population,
             target_households, is_active, established_date
             FROM community_units WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok(CommunityUnit {
                    id: uuid_col(row, 0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    ward_id: uuid_col(row, 3)?,
                    linked_facility_id: opt_uuid_col(row, 4)?,
                    target_population: row.get(5)?,
                    target_households: row.get(6)?,
                    is_active: row.get(7)?,
                    established_date: row.get(8)?,
                })
            },
        )
        .optional()?;
    Ok(unit)
}

pub fn insert_chv(conn: &Connection, chv: &CommunityHealthVolunteer) -> Result<(), DatabaseError> {
    chv.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO community_health_volunteers ({CHV_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            chv.id.to_string(),
            chv.user_id.to_string(),
            chv.community_unit_id.to_string(),
            chv.national_id,
            chv.chv_number,
            chv.date_of_birth,
            chv.gender.as_str(),
            chv.training_date,
            chv.certification_date,
            chv.certification_expiry,
            chv.is_active,
            chv.households_assigned,
        ],
    )?;
    Ok(())
}

fn chv_from_row(row: &Row<'_>) -> rusqlite::Result<CommunityHealthVolunteer> {
    Ok(CommunityHealthVolunteer {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        community_unit_id: uuid_col(row, 2)?,
        national_id: row.get(3)?,
        chv_number: row.get(4)?,
        date_of_birth: row.get(5)?,
        gender: enum_col(row, 6)?,
        training_date: row.get(7)?,
        certification_date: row.get(8)?,
        certification_expiry: row.get(9)?,
        is_active: row.get(10)?,
        households_assigned: row.get(11)?,
    })
}

pub fn get_chvs_by_unit(
    conn: &Connection,
    community_unit_id: &Uuid,
) -> Result<Vec<CommunityHealthVolunteer>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHV_COLUMNS} FROM community_health_volunteers
         WHERE community_unit_id = ?1 ORDER BY chv_number"
    ))?;
    let rows = stmt.query_map([community_unit_id.to_string()], chv_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}
