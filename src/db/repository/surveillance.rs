use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col, FilterQuery};
use crate::db::DatabaseError;
use crate::models::enums::DeathCategory;
use crate::models::*;

const SURVEILLANCE_COLUMNS: &str = "id, report_number, disease_name, disease_code, report_date,
    reporting_period_start, reporting_period_end, ward_id, facility_id, source, reported_by_id,
    cases_suspected, cases_confirmed, deaths, cases_under_5, cases_5_to_15, cases_over_15,
    males, females, outbreak_declared, response_initiated, response_details, attachments, notes";

const MORTALITY_COLUMNS: &str = "id, deceased_person_id, death_category, date_of_death,
    place_of_death, facility_id, ward_id, immediate_cause, underlying_cause,
    contributing_factors, pregnancy_related, timing, reported_by_id, report_date, autopsy_done,
    autopsy_findings, death_certificate_issued, notes";

pub fn insert_surveillance_report(
    conn: &Connection,
    r: &SurveillanceReport,
) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO surveillance_reports ({SURVEILLANCE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
        ),
        params![
            r.id.to_string(),
            r.report_number,
            r.disease_name,
            r.disease_code,
            r.report_date,
            r.reporting_period_start,
            r.reporting_period_end,
            r.ward_id.to_string(),
            opt_id(r.facility_id),
            r.source.as_str(),
            opt_id(r.reported_by_id),
            r.cases_suspected,
            r.cases_confirmed,
            r.deaths,
            r.cases_under_5,
            r.cases_5_to_15,
            r.cases_over_15,
            r.males,
            r.females,
            r.outbreak_declared,
            r.response_initiated,
            r.response_details,
            to_json(&r.attachments)?,
            r.notes,
        ],
    )?;
    Ok(())
}

fn surveillance_from_row(row: &Row<'_>) -> rusqlite::Result<SurveillanceReport> {
    Ok(SurveillanceReport {
        id: uuid_col(row, 0)?,
        report_number: row.get(1)?,
        disease_name: row.get(2)?,
        disease_code: row.get(3)?,
        report_date: row.get(4)?,
        reporting_period_start: row.get(5)?,
        reporting_period_end: row.get(6)?,
        ward_id: uuid_col(row, 7)?,
        facility_id: opt_uuid_col(row, 8)?,
        source: enum_col(row, 9)?,
        reported_by_id: opt_uuid_col(row, 10)?,
        cases_suspected: row.get(11)?,
        cases_confirmed: row.get(12)?,
        deaths: row.get(13)?,
        cases_under_5: row.get(14)?,
        cases_5_to_15: row.get(15)?,
        cases_over_15: row.get(16)?,
        males: row.get(17)?,
        females: row.get(18)?,
        outbreak_declared: row.get(19)?,
        response_initiated: row.get(20)?,
        response_details: row.get(21)?,
        attachments: json_col(row, 22)?,
        notes: row.get(23)?,
    })
}

/// Reports for one disease (exact name match), newest first.
/// `since` bounds the report date from below.
pub fn get_surveillance_reports(
    conn: &Connection,
    disease_name: Option<&str>,
    since: Option<NaiveDate>,
) -> Result<Vec<SurveillanceReport>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(name) = disease_name {
        q.eq("disease_name", name.to_string());
    }
    if let Some(date) = since {
        q.with_param("report_date >= {}", date);
    }
    let sql = format!(
        "SELECT {SURVEILLANCE_COLUMNS} FROM surveillance_reports WHERE 1=1{}
         ORDER BY report_date DESC",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), surveillance_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Reports with a declared outbreak where no response has been recorded yet.
pub fn get_unanswered_outbreaks(
    conn: &Connection,
) -> Result<Vec<SurveillanceReport>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SURVEILLANCE_COLUMNS} FROM surveillance_reports
         WHERE outbreak_declared = 1 AND response_initiated = 0
         ORDER BY report_date"
    ))?;
    let rows = stmt.query_map([], surveillance_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_mortality_report(
    conn: &Connection,
    r: &MortalityReport,
) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO mortality_reports ({MORTALITY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            r.id.to_string(),
            opt_id(r.deceased_person_id),
            r.death_category.as_str(),
            r.date_of_death,
            r.place_of_death,
            opt_id(r.facility_id),
            r.ward_id.to_string(),
            r.immediate_cause,
            r.underlying_cause,
            r.contributing_factors,
            r.pregnancy_related,
            r.timing,
            opt_id(r.reported_by_id),
            r.report_date,
            r.autopsy_done,
            r.autopsy_findings,
            r.death_certificate_issued,
            r.notes,
        ],
    )?;
    Ok(())
}

fn mortality_from_row(row: &Row<'_>) -> rusqlite::Result<MortalityReport> {
    Ok(MortalityReport {
        id: uuid_col(row, 0)?,
        deceased_person_id: opt_uuid_col(row, 1)?,
        death_category: enum_col(row, 2)?,
        date_of_death: row.get(3)?,
        place_of_death: row.get(4)?,
        facility_id: opt_uuid_col(row, 5)?,
        ward_id: uuid_col(row, 6)?,
        immediate_cause: row.get(7)?,
        underlying_cause: row.get(8)?,
        contributing_factors: row.get(9)?,
        pregnancy_related: row.get(10)?,
        timing: row.get(11)?,
        reported_by_id: opt_uuid_col(row, 12)?,
        report_date: row.get(13)?,
        autopsy_done: row.get(14)?,
        autopsy_findings: row.get(15)?,
        death_certificate_issued: row.get(16)?,
        notes: row.get(17)?,
    })
}

pub fn get_mortality_reports(
    conn: &Connection,
    category: Option<DeathCategory>,
) -> Result<Vec<MortalityReport>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(c) = category {
        q.eq("death_category", c.as_str());
    }
    let sql = format!(
        "SELECT {MORTALITY_COLUMNS} FROM mortality_reports WHERE 1=1{} ORDER BY date_of_death DESC",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), mortality_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Deaths per category, in category order; categories with no deaths are omitted.
pub fn count_deaths_by_category(
    conn: &Connection,
) -> Result<Vec<(DeathCategory, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT death_category, COUNT(*) FROM mortality_reports GROUP BY death_category",
    )?;
    let rows = stmt.query_map([], |row| Ok((enum_col::<DeathCategory>(row, 0)?, row.get(1)?)))?;
    let mut counts: Vec<(DeathCategory, i64)> = rows.collect::<Result<_, _>>()?;
    counts.sort_by_key(|(c, _)| DeathCategory::ALL.iter().position(|x| x == c));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{open_memory_database, ConstraintKind};
    use crate::models::enums::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn report(number: &str, ward: Uuid, disease: &str, date: NaiveDate) -> SurveillanceReport {
        SurveillanceReport {
            id: Uuid::new_v4(),
            report_number: number.into(),
            disease_name: disease.into(),
            disease_code: Some("A00".into()),
            report_date: date,
            reporting_period_start: date - chrono::Duration::days(7),
            reporting_period_end: date,
            ward_id: ward,
            facility_id: None,
            source: SurveillanceSource::Facility,
            reported_by_id: None,
            cases_suspected: 12,
            cases_confirmed: 4,
            deaths: 0,
            cases_under_5: 3,
            cases_5_to_15: 4,
            cases_over_15: 5,
            males: 6,
            females: 6,
            outbreak_declared: false,
            response_initiated: false,
            response_details: None,
            attachments: vec![],
            notes: None,
        }
    }

    fn mortality(ward: Uuid, category: DeathCategory) -> MortalityReport {
        MortalityReport {
            id: Uuid::new_v4(),
            deceased_person_id: None,
            death_category: category,
            date_of_death: day(2, 1),
            place_of_death: "Home".into(),
            facility_id: None,
            ward_id: ward,
            immediate_cause: "Pneumonia".into(),
            underlying_cause: None,
            contributing_factors: None,
            pregnancy_related: false,
            timing: None,
            reported_by_id: None,
            report_date: day(2, 3),
            autopsy_done: false,
            autopsy_findings: None,
            death_certificate_issued: true,
            notes: None,
        }
    }

    #[test]
    fn filter_by_disease_and_date() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        insert_surveillance_report(&conn, &report("SURV-WJR-00001", geo.ward, "Cholera", day(1, 10)))
            .unwrap();
        insert_surveillance_report(&conn, &report("SURV-WJR-00002", geo.ward, "Cholera", day(3, 10)))
            .unwrap();
        insert_surveillance_report(&conn, &report("SURV-WJR-00003", geo.ward, "Measles", day(3, 12)))
            .unwrap();

        let cholera = get_surveillance_reports(&conn, Some("Cholera"), None).unwrap();
        assert_eq!(cholera.len(), 2);
        assert_eq!(cholera[0].report_number, "SURV-WJR-00002");

        let recent = get_surveillance_reports(&conn, None, Some(day(3, 1))).unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn negative_case_counts_rejected() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let mut r = report("SURV-WJR-00001", geo.ward, "Cholera", day(1, 10));
        r.deaths = -1;
        assert!(matches!(
            insert_surveillance_report(&conn, &r),
            Err(DatabaseError::Validation(_))
        ));
    }

    #[test]
    fn outbreaks_without_response_listed() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let mut open = report("SURV-WJR-00001", geo.ward, "Cholera", day(1, 10));
        open.outbreak_declared = true;
        let mut handled = report("SURV-WJR-00002", geo.ward, "Measles", day(1, 11));
        handled.outbreak_declared = true;
        handled.response_initiated = true;
        insert_surveillance_report(&conn, &open).unwrap();
        insert_surveillance_report(&conn, &handled).unwrap();

        let pending = get_unanswered_outbreaks(&conn).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].disease_name, "Cholera");
    }

    #[test]
    fn mortality_survives_person_delete() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        let person = fixtures::person(&conn, hh, "Aden", Gender::Male, day(1, 1));
        let mut r = mortality(geo.ward, DeathCategory::Infant);
        r.deceased_person_id = Some(person);
        insert_mortality_report(&conn, &r).unwrap();

        conn.execute("DELETE FROM persons WHERE id = ?1", [person.to_string()])
            .unwrap();
        let reports = get_mortality_reports(&conn, Some(DeathCategory::Infant)).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].deceased_person_id, None);
    }

    #[test]
    fn reports_survive_reporter_delete() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        let reporter = fixtures::user(&conn, 1);
        let mut surv = report("SURV-WJR-00001", geo.ward, "Cholera", day(1, 10));
        surv.reported_by_id = Some(reporter);
        insert_surveillance_report(&conn, &surv).unwrap();
        let mut death = mortality(geo.ward, DeathCategory::Adult);
        death.reported_by_id = Some(reporter);
        insert_mortality_report(&conn, &death).unwrap();

        conn.execute("DELETE FROM users WHERE id = ?1", [reporter.to_string()])
            .unwrap();

        let surveillance = get_surveillance_reports(&conn, None, None).unwrap();
        assert_eq!(surveillance.len(), 1);
        assert_eq!(surveillance[0].reported_by_id, None);
        let deaths = get_mortality_reports(&conn, None).unwrap();
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].reported_by_id, None);
    }

    #[test]
    fn deaths_counted_per_category() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        insert_mortality_report(&conn, &mortality(geo.ward, DeathCategory::Adult)).unwrap();
        insert_mortality_report(&conn, &mortality(geo.ward, DeathCategory::Neonatal)).unwrap();
        insert_mortality_report(&conn, &mortality(geo.ward, DeathCategory::Adult)).unwrap();

        let counts = count_deaths_by_category(&conn).unwrap();
        assert_eq!(
            counts,
            vec![(DeathCategory::Neonatal, 1), (DeathCategory::Adult, 2)]
        );
    }

    #[test]
    fn ward_delete_cascades_reports() {
        let conn = open_memory_database().unwrap();
        let geo = fixtures::geo(&conn);
        insert_surveillance_report(&conn, &report("SURV-WJR-00001", geo.ward, "Cholera", day(1, 10)))
            .unwrap();
        conn.execute("DELETE FROM wards WHERE id = ?1", [geo.ward.to_string()])
            .unwrap();
        assert!(get_surveillance_reports(&conn, None, None).unwrap().is_empty());

        let err = insert_surveillance_report(
            &conn,
            &report("SURV-WJR-00002", geo.ward, "Cholera", day(1, 11)),
        )
        .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    }
}
