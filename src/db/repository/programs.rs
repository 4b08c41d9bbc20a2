use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

const MONTHLY_REPORT_COLUMNS: &str = "id, facility_id, subcounty_id, year, month,
    outpatient_visits, inpatient_admissions, anc_visits, deliveries, immunizations_given,
    malaria_cases, tb_cases, hiv_tests, indicators, submitted_by_id, submission_date, approved,
    approved_by_id, approval_date, notes";

const CAMPAIGN_COLUMNS: &str = "id, program_id, name, campaign_type, start_date, end_date,
    target_area, target_population, people_reached, objectives, activities, budget,
    actual_expenditure, campaign_manager_id, status, final_report";

pub fn insert_program(conn: &Connection, p: &Program) -> Result<(), DatabaseError> {
    p.validate()?;
    conn.execute(
        "INSERT INTO programs (id, name, code, description, start_date, end_date, county_id,
         program_manager_id, budget, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            p.id.to_string(),
            p.name,
            p.code,
            p.description,
            p.start_date,
            p.end_date,
            p.county_id.to_string(),
            opt_id(p.program_manager_id),
            p.budget,
            p.is_active,
        ],
    )?;
    Ok(())
}

pub fn get_program_by_code(conn: &Connection, code: &str) -> Result<Option<Program>, DatabaseError> {
    let program = conn
        .query_row(
            "SELECT id, name, code, description, start_date, end_date, county_id,
             program_manager_id, budget, is_active
             FROM programs WHERE code = ?1",
            [code],
            |row| {
                Ok(Program {
                    id: uuid_col(row, 0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    description: row.get(3)?,
                    start_date: row.get(4)?,
                    end_date: row.get(5)?,
                    county_id: uuid_col(row, 6)?,
                    program_manager_id: opt_uuid_col(row, 7)?,
                    budget: row.get(8)?,
                    is_active: row.get(9)?,
                })
            },
        )
        .optional()?;
    Ok(program)
}

pub fn insert_indicator(conn: &Connection, i: &Indicator) -> Result<(), DatabaseError> {
    i.validate()?;
    conn.execute(
        "INSERT INTO indicators (id, program_id, name, code, indicator_type, definition,
         numerator_definition, denominator_definition, calculation_method, target_value,
         baseline_value, reporting_frequency, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            i.id.to_string(),
            i.program_id.to_string(),
            i.name,
            i.code,
            i.indicator_type.as_str(),
            i.definition,
            i.numerator_definition,
            i.denominator_definition,
            i.calculation_method,
            i.target_value,
            i.baseline_value,
            i.reporting_frequency,
            i.is_active,
        ],
    )?;
    Ok(())
}

pub fn get_indicators_for_program(
    conn: &Connection,
    program_id: &Uuid,
) -> Result<Vec<Indicator>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, program_id, name, code, indicator_type, definition, numerator_definition,
         denominator_definition, calculation_method, target_value, baseline_value,
         reporting_frequency, is_active
         FROM indicators WHERE program_id = ?1 ORDER BY code",
    )?;
    let rows = stmt.query_map([program_id.to_string()], |row| {
        Ok(Indicator {
            id: uuid_col(row, 0)?,
            program_id: uuid_col(row, 1)?,
            name: row.get(2)?,
            code: row.get(3)?,
            indicator_type: enum_col(row, 4)?,
            definition: row.get(5)?,
            numerator_definition: row.get(6)?,
            denominator_definition: row.get(7)?,
            calculation_method: row.get(8)?,
            target_value: row.get(9)?,
            baseline_value: row.get(10)?,
            reporting_frequency: row.get(11)?,
            is_active: row.get(12)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_monthly_report(conn: &Connection, r: &MonthlyReport) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO monthly_reports ({MONTHLY_REPORT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20)"
        ),
        params![
            r.id.to_string(),
            opt_id(r.facility_id),
            opt_id(r.subcounty_id),
            r.year,
            r.month,
            r.outpatient_visits,
            r.inpatient_admissions,
            r.anc_visits,
            r.deliveries,
            r.immunizations_given,
            r.malaria_cases,
            r.tb_cases,
            r.hiv_tests,
            to_json(&r.indicators)?,
            opt_id(r.submitted_by_id),
            r.submission_date,
            r.approved,
            opt_id(r.approved_by_id),
            r.approval_date,
            r.notes,
        ],
    )?;
    Ok(())
}

fn monthly_report_from_row(row: &Row<'_>) -> rusqlite::Result<MonthlyReport> {
    Ok(MonthlyReport {
        id: uuid_col(row, 0)?,
        facility_id: opt_uuid_col(row, 1)?,
        subcounty_id: opt_uuid_col(row, 2)?,
        year: row.get(3)?,
        month: row.get(4)?,
        outpatient_visits: row.get(5)?,
        inpatient_admissions: row.get(6)?,
        anc_visits: row.get(7)?,
        deliveries: row.get(8)?,
        immunizations_given: row.get(9)?,
        malaria_cases: row.get(10)?,
        tb_cases: row.get(11)?,
        hiv_tests: row.get(12)?,
        indicators: json_col(row, 13)?,
        submitted_by_id: opt_uuid_col(row, 14)?,
        submission_date: row.get(15)?,
        approved: row.get(16)?,
        approved_by_id: opt_uuid_col(row, 17)?,
        approval_date: row.get(18)?,
        notes: row.get(19)?,
    })
}

pub fn get_monthly_reports_for_facility(
    conn: &Connection,
    facility_id: &Uuid,
) -> Result<Vec<MonthlyReport>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MONTHLY_REPORT_COLUMNS} FROM monthly_reports
         WHERE facility_id = ?1 ORDER BY year DESC, month DESC"
    ))?;
    let rows = stmt.query_map([facility_id.to_string()], monthly_report_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Bulk approval. Reports already approved are left untouched.
pub fn approve_monthly_reports(
    conn: &Connection,
    ids: &[Uuid],
    approver_id: &Uuid,
    approved_at: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "UPDATE monthly_reports SET approved = 1, approved_by_id = ?1, approval_date = ?2
         WHERE id = ?3 AND approved = 0",
    )?;
    let mut updated = 0;
    for id in ids {
        updated += stmt.execute(params![approver_id.to_string(), approved_at, id.to_string()])?;
    }
    tracing::info!(updated, "Monthly reports approved");
    Ok(updated)
}

/// Inserts the campaign row and one `campaign_wards` row per ward.
pub fn insert_campaign(conn: &Connection, c: &Campaign) -> Result<(), DatabaseError> {
    c.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO campaigns ({CAMPAIGN_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            c.id.to_string(),
            c.program_id.to_string(),
            c.name,
            c.campaign_type,
            c.start_date,
            c.end_date,
            c.target_area,
            c.target_population,
            c.people_reached,
            c.objectives,
            to_json(&c.activities)?,
            c.budget,
            c.actual_expenditure,
            opt_id(c.campaign_manager_id),
            c.status.as_str(),
            c.final_report,
        ],
    )?;
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO campaign_wards (campaign_id, ward_id) VALUES (?1, ?2)")?;
    for ward_id in &c.ward_ids {
        stmt.execute(params![c.id.to_string(), ward_id.to_string()])?;
    }
    Ok(())
}

pub fn get_campaign(conn: &Connection, id: &Uuid) -> Result<Option<Campaign>, DatabaseError> {
    let campaign = conn
        .query_row(
            &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
            [id.to_string()],
            |row| {
                Ok(Campaign {
                    id: uuid_col(row, 0)?,
                    program_id: uuid_col(row, 1)?,
                    name: row.get(2)?,
                    campaign_type: row.get(3)?,
                    start_date: row.get(4)?,
                    end_date: row.get(5)?,
                    target_area: row.get(6)?,
                    ward_ids: Vec::new(),
                    target_population: row.get(7)?,
                    people_reached: row.get(8)?,
                    objectives: row.get(9)?,
                    activities: json_col(row, 10)?,
                    budget: row.get(11)?,
                    actual_expenditure: row.get(12)?,
                    campaign_manager_id: opt_uuid_col(row, 13)?,
                    status: enum_col(row, 14)?,
                    final_report: row.get(15)?,
                })
            },
        )
        .optional()?;
    match campaign {
        Some(mut c) => {
            c.ward_ids = get_campaign_wards(conn, &c.id)?;
            Ok(Some(c))
        }
        None => Ok(None),
    }
}

pub fn get_campaign_wards(conn: &Connection, campaign_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT cw.ward_id FROM campaign_wards cw
         JOIN wards w ON w.id = cw.ward_id
         WHERE cw.campaign_id = ?1 ORDER BY w.code",
    )?;
    let rows = stmt.query_map([campaign_id.to_string()], |row| uuid_col(row, 0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{insert_ward, open_memory_database, ConstraintKind};
    use crate::models::enums::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn program(county: Uuid) -> Program {
        Program {
            id: Uuid::new_v4(),
            name: "Maternal and Child Health".into(),
            code: "MCH".into(),
            description: "Improving maternal and child health outcomes".into(),
            start_date: day(1, 1),
            end_date: None,
            county_id: county,
            program_manager_id: None,
            budget: Some(5_000_000.0),
            is_active: true,
        }
    }

    fn report(facility: Uuid, month: u32) -> MonthlyReport {
        let mut indicators = BTreeMap::new();
        indicators.insert("MCH-01".to_string(), 72.5);
        MonthlyReport {
            id: Uuid::new_v4(),
            facility_id: Some(facility),
            subcounty_id: None,
            year: 2024,
            month,
            outpatient_visits: 850,
            inpatient_admissions: 40,
            anc_visits: 120,
            deliveries: 30,
            immunizations_given: 200,
            malaria_cases: 75,
            tb_cases: 3,
            hiv_tests: 150,
            indicators,
            submitted_by_id: None,
            submission_date: day(month, 5).and_hms_opt(9, 0, 0).unwrap(),
            approved: false,
            approved_by_id: None,
            approval_date: None,
            notes: None,
        }
    }

    #[test]
    fn indicator_frequency_checked_by_schema() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let p = program(geo.county);
        insert_program(&conn, &p).unwrap();
        let mut ind = Indicator {
            id: Uuid::new_v4(),
            program_id: p.id,
            name: "ANC 4th Visit Coverage".into(),
            code: "MCH-01".into(),
            indicator_type: IndicatorType::Outcome,
            definition: "Women completing four ANC visits".into(),
            numerator_definition: "Women with four visits".into(),
            denominator_definition: Some("Expected pregnancies".into()),
            calculation_method: "Numerator / Denominator * 100".into(),
            target_value: Some(80.0),
            baseline_value: Some(45.0),
            reporting_frequency: "Weekly".into(),
            is_active: true,
        };
        let err = insert_indicator(&conn, &ind).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));

        ind.reporting_frequency = "Quarterly".into();
        insert_indicator(&conn, &ind).unwrap();
        let loaded = get_indicators_for_program(&conn, &p.id).unwrap();
        assert_eq!(loaded[0].indicator_type, IndicatorType::Outcome);
        assert!(get_program_by_code(&conn, "MCH").unwrap().is_some());
    }

    #[test]
    fn one_report_per_facility_month() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let f = fixtures::facility(&conn, &geo, "HC0100", FacilityType::HealthCentre);
        insert_monthly_report(&conn, &report(f, 3)).unwrap();
        let err = insert_monthly_report(&conn, &report(f, 3)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
        insert_monthly_report(&conn, &report(f, 4)).unwrap();

        let reports = get_monthly_reports_for_facility(&conn, &f).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].month, 4);
        assert_eq!(reports[0].indicators.get("MCH-01"), Some(&72.5));
    }

    #[test]
    fn approval_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let f = fixtures::facility(&conn, &geo, "HC0100", FacilityType::HealthCentre);
        let approver = fixtures::user(&conn, 1);
        let r = report(f, 3);
        insert_monthly_report(&conn, &r).unwrap();

        let first = day(4, 1).and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(approve_monthly_reports(&conn, &[r.id], &approver, first).unwrap(), 1);
        let later = day(4, 9).and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(approve_monthly_reports(&conn, &[r.id], &approver, later).unwrap(), 0);

        let loaded = &get_monthly_reports_for_facility(&conn, &f).unwrap()[0];
        assert!(loaded.approved);
        assert_eq!(loaded.approval_date, Some(first));
        assert_eq!(loaded.approved_by_id, Some(approver));
    }

    #[test]
    fn campaign_wards_stored_in_join_table() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let second = Ward {
            id: Uuid::new_v4(),
            subcounty_id: geo.subcounty,
            name: "Elnur/Tula Tula".into(),
            code: "WJR-EL-W02".into(),
            population: None,
        };
        insert_ward(&conn, &second).unwrap();
        let p = program(geo.county);
        insert_program(&conn, &p).unwrap();

        let campaign = Campaign {
            id: Uuid::new_v4(),
            program_id: p.id,
            name: "Polio Vaccination Drive".into(),
            campaign_type: "Immunization".into(),
            start_date: day(2, 1),
            end_date: day(2, 14),
            target_area: "Eldas".into(),
            ward_ids: vec![second.id, geo.ward, geo.ward],
            target_population: 5000,
            people_reached: 4200,
            objectives: "Vaccinate all under-5 children".into(),
            activities: vec!["House-to-house vaccination".into()],
            budget: 800_000.0,
            actual_expenditure: 650_000.0,
            campaign_manager_id: None,
            status: CampaignStatus::Completed,
            final_report: None,
        };
        insert_campaign(&conn, &campaign).unwrap();

        let loaded = get_campaign(&conn, &campaign.id).unwrap().unwrap();
        assert_eq!(loaded.ward_ids, vec![geo.ward, second.id]);
        assert_eq!(loaded.activities.len(), 1);
        assert_eq!(loaded.status, CampaignStatus::Completed);

        conn.execute("DELETE FROM wards WHERE id = ?1", [second.id.to_string()])
            .unwrap();
        assert_eq!(get_campaign_wards(&conn, &campaign.id).unwrap(), vec![geo.ward]);
    }
}
