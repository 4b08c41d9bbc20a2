use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_county(conn: &Connection, county: &County) -> Result<(), DatabaseError> {
    county.validate()?;
    conn.execute(
        "INSERT INTO counties (id, name, code, population, contact_person, phone, email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            county.id.to_string(),
            county.name,
            county.code,
            county.population,
            county.contact_person,
            county.phone,
            county.email,
        ],
    )?;
    Ok(())
}

pub fn insert_subcounty(conn: &Connection, subcounty: &SubCounty) -> Result<(), DatabaseError> {
    subcounty.validate()?;
    conn.execute(
        "INSERT INTO subcounties (id, county_id, name, code, population)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            subcounty.id.to_string(),
            subcounty.county_id.to_string(),
            subcounty.name,
            subcounty.code,
            subcounty.population,
        ],
    )?;
    Ok(())
}

pub fn insert_ward(conn: &Connection, ward: &Ward) -> Result<(), DatabaseError> {
    ward.validate()?;
    conn.execute(
        "INSERT INTO wards (id, subcounty_id, name, code, population)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ward.id.to_string(),
            ward.subcounty_id.to_string(),
            ward.name,
            ward.code,
            ward.population,
        ],
    )?;
    Ok(())
}

fn county_from_row(row: &Row<'_>) -> rusqlite::Result<County> {
    Ok(County {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        population: row.get(3)?,
        contact_person: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
    })
}

pub fn get_county_by_code(conn: &Connection, code: &str) -> Result<Option<County>, DatabaseError> {
    let county = conn
        .query_row(
            "SELECT id, name, code, population, contact_person, phone, email
             FROM counties WHERE code = ?1",
            [code],
            county_from_row,
        )
        .optional()?;
    Ok(county)
}

pub fn get_subcounties(conn: &Connection, county_id: &Uuid) -> Result<Vec<SubCounty>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, county_id, name, code, population
         FROM subcounties WHERE county_id = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map([county_id.to_string()], |row| {
        Ok(SubCounty {
            id: uuid_col(row, 0)?,
            county_id: uuid_col(row, 1)?,
            name: row.get(2)?,
            code: row.get(3)?,
            population: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn get_all_wards(conn: &Connection) -> Result<Vec<Ward>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, subcounty_id, name, code, population FROM wards ORDER BY code",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Ward {
            id: uuid_col(row, 0)?,
            subcounty_id: uuid_col(row, 1)?,
            name: row.get(2)?,
            code: row.get(3)?,
            population: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// County reached from a ward through its sub-county.
pub fn get_ward_county_id(conn: &Connection, ward_id: &Uuid) -> Result<Uuid, DatabaseError> {
    let county: Option<String> = conn
        .query_row(
            "SELECT s.county_id FROM wards w
             JOIN subcounties s ON s.id = w.subcounty_id
             WHERE w.id = ?1",
            [ward_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let county = county.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Ward".into(),
        id: ward_id.to_string(),
    })?;
    Uuid::parse_str(&county).map_err(|e| DatabaseError::InvalidColumn {
        column: "subcounties.county_id".into(),
        reason: e.to_string(),
    })
}

pub fn delete_county(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let removed = conn.execute("DELETE FROM counties WHERE id = ?1", [id.to_string()])?;
    if removed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "County".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
