use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{json_col, opt_id, opt_uuid_col, to_json, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

const PREGNANCY_COLUMNS: &str = "id, woman_id, lmp_date, edd, gravida, parity, risk_factors,
    is_high_risk, anc_visits_completed, delivery_date, delivery_outcome, delivery_facility_id,
    is_active, notes";

const IMMUNIZATION_COLUMNS: &str = "id, child_id, vaccine_name, vaccine_code, dose_number,
    administration_date, administered_by_id, facility_id, batch_number, expiry_date, site,
    adverse_reaction, next_dose_date";

pub fn insert_pregnancy(conn: &Connection, p: &PregnancyRecord) -> Result<(), DatabaseError> {
    p.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO pregnancy_records ({PREGNANCY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            p.id.to_string(),
            p.woman_id.to_string(),
            p.lmp_date,
            p.edd,
            p.gravida,
            p.parity,
            to_json(&p.risk_factors)?,
            p.is_high_risk,
            p.anc_visits_completed,
            p.delivery_date,
            p.delivery_outcome,
            opt_id(p.delivery_facility_id),
            p.is_active,
            p.notes,
        ],
    )?;
    Ok(())
}

fn pregnancy_from_row(row: &Row<'_>) -> rusqlite::Result<PregnancyRecord> {
    Ok(PregnancyRecord {
        id: uuid_col(row, 0)?,
        woman_id: uuid_col(row, 1)?,
        lmp_date: row.get(2)?,
        edd: row.get(3)?,
        gravida: row.get(4)?,
        parity: row.get(5)?,
        risk_factors: json_col(row, 6)?,
        is_high_risk: row.get(7)?,
        anc_visits_completed: row.get(8)?,
        delivery_date: row.get(9)?,
        delivery_outcome: row.get(10)?,
        delivery_facility_id: opt_uuid_col(row, 11)?,
        is_active: row.get(12)?,
        notes: row.get(13)?,
    })
}

pub fn get_pregnancy(conn: &Connection, id: &Uuid) -> Result<Option<PregnancyRecord>, DatabaseError> {
    let p = conn
        .query_row(
            &format!("SELECT {PREGNANCY_COLUMNS} FROM pregnancy_records WHERE id = ?1"),
            [id.to_string()],
            pregnancy_from_row,
        )
        .optional()?;
    Ok(p)
}

pub fn get_all_pregnancies(conn: &Connection) -> Result<Vec<PregnancyRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PREGNANCY_COLUMNS} FROM pregnancy_records ORDER BY lmp_date"
    ))?;
    let rows = stmt.query_map([], pregnancy_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_anc_visit(conn: &Connection, v: &AncVisit) -> Result<(), DatabaseError> {
    v.validate()?;
    conn.execute(
        "INSERT INTO anc_visits (id, pregnancy_id, visit_number, visit_date, gestation_weeks,
         facility_id, attended_by_id, weight, blood_pressure, hemoglobin, tests_done,
         supplements_given, next_visit_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            v.id.to_string(),
            v.pregnancy_id.to_string(),
            v.visit_number,
            v.visit_date,
            v.gestation_weeks,
            opt_id(v.facility_id),
            opt_id(v.attended_by_id),
            v.weight,
            v.blood_pressure,
            v.hemoglobin,
            to_json(&v.tests_done)?,
            to_json(&v.supplements_given)?,
            v.next_visit_date,
            v.notes,
        ],
    )?;
    Ok(())
}

pub fn get_anc_visits(conn: &Connection, pregnancy_id: &Uuid) -> Result<Vec<AncVisit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, pregnancy_id, visit_number, visit_date, gestation_weeks, facility_id,
         attended_by_id, weight, blood_pressure, hemoglobin, tests_done, supplements_given,
         next_visit_date, notes
         FROM anc_visits WHERE pregnancy_id = ?1 ORDER BY visit_number",
    )?;
    let rows = stmt.query_map([pregnancy_id.to_string()], |row| {
        Ok(AncVisit {
            id: uuid_col(row, 0)?,
            pregnancy_id: uuid_col(row, 1)?,
            visit_number: row.get(2)?,
            visit_date: row.get(3)?,
            gestation_weeks: row.get(4)?,
            facility_id: opt_uuid_col(row, 5)?,
            attended_by_id: opt_uuid_col(row, 6)?,
            weight: row.get(7)?,
            blood_pressure: row.get(8)?,
            hemoglobin: row.get(9)?,
            tests_done: json_col(row, 10)?,
            supplements_given: json_col(row, 11)?,
            next_visit_date: row.get(12)?,
            notes: row.get(13)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_pnc_visit(conn: &Connection, v: &PncVisit) -> Result<(), DatabaseError> {
    v.validate()?;
    conn.execute(
        "INSERT INTO pnc_visits (id, pregnancy_id, visit_number, visit_date, days_postpartum,
         facility_id, attended_by_id, mother_condition, baby_condition, breastfeeding_well,
         family_planning_counselled, next_visit_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            v.id.to_string(),
            v.pregnancy_id.to_string(),
            v.visit_number,
            v.visit_date,
            v.days_postpartum,
            opt_id(v.facility_id),
            opt_id(v.attended_by_id),
            v.mother_condition,
            v.baby_condition,
            v.breastfeeding_well,
            v.family_planning_counselled,
            v.next_visit_date,
            v.notes,
        ],
    )?;
    Ok(())
}

pub fn get_pnc_visits(conn: &Connection, pregnancy_id: &Uuid) -> Result<Vec<PncVisit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, pregnancy_id, visit_number, visit_date, days_postpartum, facility_id,
         attended_by_id, mother_condition, baby_condition, breastfeeding_well,
         family_planning_counselled, next_visit_date, notes
         FROM pnc_visits WHERE pregnancy_id = ?1 ORDER BY visit_number",
    )?;
    let rows = stmt.query_map([pregnancy_id.to_string()], |row| {
        Ok(PncVisit {
            id: uuid_col(row, 0)?,
            pregnancy_id: uuid_col(row, 1)?,
            visit_number: row.get(2)?,
            visit_date: row.get(3)?,
            days_postpartum: row.get(4)?,
            facility_id: opt_uuid_col(row, 5)?,
            attended_by_id: opt_uuid_col(row, 6)?,
            mother_condition: row.get(7)?,
            baby_condition: row.get(8)?,
            breastfeeding_well: row.get(9)?,
            family_planning_counselled: row.get(10)?,
            next_visit_date: row.get(11)?,
            notes: row.get(12)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_immunization(conn: &Connection, r: &ImmunizationRecord) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO immunization_records ({IMMUNIZATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            r.id.to_string(),
            r.child_id.to_string(),
            r.vaccine_name,
            r.vaccine_code,
            r.dose_number,
            r.administration_date,
            opt_id(r.administered_by_id),
            opt_id(r.facility_id),
            r.batch_number,
            r.expiry_date,
            r.site,
            r.adverse_reaction,
            r.next_dose_date,
        ],
    )?;
    Ok(())
}

pub fn get_immunizations_for_child(
    conn: &Connection,
    child_id: &Uuid,
) -> Result<Vec<ImmunizationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {IMMUNIZATION_COLUMNS} FROM immunization_records
         WHERE child_id = ?1 ORDER BY administration_date, vaccine_code"
    ))?;
    let rows = stmt.query_map([child_id.to_string()], |row| {
        Ok(ImmunizationRecord {
            id: uuid_col(row, 0)?,
            child_id: uuid_col(row, 1)?,
            vaccine_name: row.get(2)?,
            vaccine_code: row.get(3)?,
            dose_number: row.get(4)?,
            administration_date: row.get(5)?,
            administered_by_id: opt_uuid_col(row, 6)?,
            facility_id: opt_uuid_col(row, 7)?,
            batch_number: row.get(8)?,
            expiry_date: row.get(9)?,
            site: row.get(10)?,
            adverse_reaction: row.get(11)?,
            next_dose_date: row.get(12)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{open_memory_database, ConstraintKind};
    use crate::models::enums::Gender;

    fn pregnancy(conn: &Connection) -> PregnancyRecord {
        let geo = fixtures::geo(conn);
        let hh = fixtures::household(conn, &geo, "WJR-HH000001");
        let woman = fixtures::person(
            conn,
            hh,
            "Amina",
            Gender::Female,
            NaiveDate::from_ymd_opt(1995, 3, 1).unwrap(),
        );
        let lmp = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let p = PregnancyRecord {
            id: Uuid::new_v4(),
            woman_id: woman,
            lmp_date: lmp,
            edd: lmp + Duration::days(280),
            gravida: 2,
            parity: 1,
            risk_factors: vec!["Anemia".into()],
            is_high_risk: true,
            anc_visits_completed: 1,
            delivery_date: None,
            delivery_outcome: None,
            delivery_facility_id: None,
            is_active: true,
            notes: None,
        };
        insert_pregnancy(conn, &p).unwrap();
        p
    }

    fn anc(pregnancy_id: Uuid, n: i32, date: NaiveDate) -> AncVisit {
        AncVisit {
            id: Uuid::new_v4(),
            pregnancy_id,
            visit_number: n,
            visit_date: date,
            gestation_weeks: 12,
            facility_id: None,
            attended_by_id: None,
            weight: Some(60.0),
            blood_pressure: Some("120/80".into()),
            hemoglobin: Some(11.2),
            tests_done: vec!["HIV Test".into()],
            supplements_given: vec!["Iron".into()],
            next_visit_date: None,
            notes: None,
        }
    }

    #[test]
    fn pregnancy_round_trip() {
        let conn = open_memory_database().unwrap();
        let p = pregnancy(&conn);
        let loaded = get_pregnancy(&conn, &p.id).unwrap().unwrap();
        assert_eq!(loaded.edd, NaiveDate::from_ymd_opt(2024, 10, 16).unwrap());
        assert_eq!(loaded.risk_factors, vec!["Anemia"]);
        assert!(loaded.is_high_risk);
    }

    #[test]
    fn anc_visit_number_unique_per_pregnancy() {
        let conn = open_memory_database().unwrap();
        let p = pregnancy(&conn);
        let date = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
        insert_anc_visit(&conn, &anc(p.id, 1, date)).unwrap();
        let err = insert_anc_visit(&conn, &anc(p.id, 1, date)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
        insert_anc_visit(&conn, &anc(p.id, 2, date + Duration::weeks(8))).unwrap();
        let visits = get_anc_visits(&conn, &p.id).unwrap();
        assert_eq!(visits.iter().map(|v| v.visit_number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(visits[0].supplements_given, vec!["Iron"]);
    }

    #[test]
    fn deleting_pregnancy_cascades_to_visits() {
        let conn = open_memory_database().unwrap();
        let p = pregnancy(&conn);
        insert_anc_visit(&conn, &anc(p.id, 1, p.lmp_date + Duration::weeks(12))).unwrap();
        conn.execute("DELETE FROM pregnancy_records WHERE id = ?1", [p.id.to_string()])
            .unwrap();
        assert!(get_anc_visits(&conn, &p.id).unwrap().is_empty());
    }

    #[test]
    fn pnc_visit_round_trip() {
        let conn = open_memory_database().unwrap();
        let p = pregnancy(&conn);
        let v = PncVisit {
            id: Uuid::new_v4(),
            pregnancy_id: p.id,
            visit_number: 1,
            visit_date: p.edd + Duration::days(2),
            days_postpartum: 2,
            facility_id: None,
            attended_by_id: None,
            mother_condition: Some("Stable".into()),
            baby_condition: Some("Healthy".into()),
            breastfeeding_well: true,
            family_planning_counselled: false,
            next_visit_date: Some(p.edd + Duration::days(7)),
            notes: None,
        };
        insert_pnc_visit(&conn, &v).unwrap();
        let visits = get_pnc_visits(&conn, &p.id).unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].days_postpartum, 2);
    }
}
