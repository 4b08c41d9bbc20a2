use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_household_visit(conn: &Connection, v: &HouseholdVisit) -> Result<(), DatabaseError> {
    v.validate()?;
    conn.execute(
        "INSERT INTO household_visits (id, household_id, chv_id, visit_date, visit_type,
         members_present, services_provided, findings, action_taken, referrals_made,
         next_visit_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            v.id.to_string(),
            v.household_id.to_string(),
            opt_id(v.chv_id),
            v.visit_date,
            v.visit_type.as_str(),
            v.members_present,
            to_json(&v.services_provided)?,
            v.findings,
            v.action_taken,
            v.referrals_made,
            v.next_visit_date,
        ],
    )?;
    Ok(())
}

pub fn get_household_visits(
    conn: &Connection,
    household_id: &Uuid,
) -> Result<Vec<HouseholdVisit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, chv_id, visit_date, visit_type, members_present,
         services_provided, findings, action_taken, referrals_made, next_visit_date
         FROM household_visits WHERE household_id = ?1 ORDER BY visit_date DESC",
    )?;
    let rows = stmt.query_map([household_id.to_string()], |row| {
        Ok(HouseholdVisit {
            id: uuid_col(row, 0)?,
            household_id: uuid_col(row, 1)?,
            chv_id: opt_uuid_col(row, 2)?,
            visit_date: row.get(3)?,
            visit_type: enum_col(row, 4)?,
            members_present: row.get(5)?,
            services_provided: json_col(row, 6)?,
            findings: row.get(7)?,
            action_taken: row.get(8)?,
            referrals_made: row.get(9)?,
            next_visit_date: row.get(10)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_outreach_event(conn: &Connection, e: &OutreachEvent) -> Result<(), DatabaseError> {
    e.validate()?;
    conn.execute(
        "INSERT INTO outreach_events (id, name, event_type, start_date, end_date, location,
         ward_id, target_population, people_reached, organizing_facility_id, partners,
         services_offered, commodities_used, budget, actual_cost, report)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            e.id.to_string(),
            e.name,
            e.event_type.as_str(),
            e.start_date,
            e.end_date,
            e.location,
            e.ward_id.to_string(),
            e.target_population,
            e.people_reached,
            opt_id(e.organizing_facility_id),
            e.partners,
            to_json(&e.services_offered)?,
            to_json(&e.commodities_used)?,
            e.budget,
            e.actual_cost,
            e.report,
        ],
    )?;
    Ok(())
}

pub fn get_all_outreach_events(conn: &Connection) -> Result<Vec<OutreachEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, event_type, start_date, end_date, location, ward_id,
         target_population, people_reached, organizing_facility_id, partners,
         services_offered, commodities_used, budget, actual_cost, report
         FROM outreach_events ORDER BY start_date DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(OutreachEvent {
            id: uuid_col(row, 0)?,
            name: row.get(1)?,
            event_type: enum_col(row, 2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            location: row.get(5)?,
            ward_id: uuid_col(row, 6)?,
            target_population: row.get(7)?,
            people_reached: row.get(8)?,
            organizing_facility_id: opt_uuid_col(row, 9)?,
            partners: row.get(10)?,
            services_offered: json_col(row, 11)?,
            commodities_used: json_col(row, 12)?,
            budget: row.get(13)?,
            actual_cost: row.get(14)?,
            report: row.get(15)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_screening(conn: &Connection, s: &Screening) -> Result<(), DatabaseError> {
    s.validate()?;
    conn.execute(
        "INSERT INTO screenings (id, person_id, screening_type, screening_date, screened_by_id,
         facility_id, outreach_event_id, result, result_details, follow_up_required,
         follow_up_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            s.id.to_string(),
            s.person_id.to_string(),
            s.screening_type.as_str(),
            s.screening_date,
            opt_id(s.screened_by_id),
            opt_id(s.facility_id),
            opt_id(s.outreach_event_id),
            s.result.as_str(),
            to_json(&s.result_details)?,
            s.follow_up_required,
            s.follow_up_date,
            s.notes,
        ],
    )?;
    Ok(())
}

pub fn get_screenings_for_person(
    conn: &Connection,
    person_id: &Uuid,
) -> Result<Vec<Screening>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, person_id, screening_type, screening_date, screened_by_id, facility_id,
         outreach_event_id, result, result_details, follow_up_required, follow_up_date, notes
         FROM screenings WHERE person_id = ?1 ORDER BY screening_date DESC",
    )?;
    let rows = stmt.query_map([person_id.to_string()], |row| {
        Ok(Screening {
            id: uuid_col(row, 0)?,
            person_id: uuid_col(row, 1)?,
            screening_type: enum_col(row, 2)?,
            screening_date: row.get(3)?,
            screened_by_id: opt_uuid_col(row, 4)?,
            facility_id: opt_uuid_col(row, 5)?,
            outreach_event_id: opt_uuid_col(row, 6)?,
            result: enum_col(row, 7)?,
            result_details: json_col(row, 8)?,
            follow_up_required: row.get(9)?,
            follow_up_date: row.get(10)?,
            notes: row.get(11)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}
