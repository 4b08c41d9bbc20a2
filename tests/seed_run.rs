//! End-to-end properties of a full seed run.

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use uuid::Uuid;

use wajir_hmis::config::SeedConfig;
use wajir_hmis::crypto::verify_password;
use wajir_hmis::db::*;
use wajir_hmis::seed::derive::{GESTATION_DAYS, IMMUNIZATION_SCHEDULE, PNC_SCHEDULE_DAYS};
use wajir_hmis::seed::run_seed;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn config(rng_seed: u64) -> SeedConfig {
    SeedConfig {
        rng_seed,
        today: today(),
        password: "password123".into(),
        password_iterations: 1_000,
    }
}

fn seeded() -> Connection {
    let conn = open_memory_database().unwrap();
    run_seed(&conn, &config(2019)).unwrap();
    conn
}

fn scalar(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn ids(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("SELECT id FROM {table} ORDER BY id"))
        .unwrap();
    let rows = stmt.query_map([], |row| row.get(0)).unwrap();
    rows.collect::<Result<_, _>>().unwrap()
}

#[test]
fn wajir_county_with_six_subcounties() {
    let conn = seeded();
    let county = get_county_by_code(&conn, "WJR").unwrap().unwrap();
    assert_eq!(county.name, "Wajir");
    assert_eq!(county.population, Some(781_263));
    assert_eq!(get_subcounties(&conn, &county.id).unwrap().len(), 6);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM counties"), 1);
}

#[test]
fn every_ward_resolves_to_the_county() {
    let conn = seeded();
    let county = get_county_by_code(&conn, "WJR").unwrap().unwrap();
    let wards = get_all_wards(&conn).unwrap();
    assert_eq!(wards.len(), 24);
    for ward in &wards {
        assert_eq!(get_ward_county_id(&conn, &ward.id).unwrap(), county.id);
    }
    // A facility's sub-county is the sub-county of its ward.
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM facilities f JOIN wards w ON w.id = f.ward_id
             WHERE f.subcounty_id <> w.subcounty_id"
        ),
        0
    );
}

#[test]
fn households_share_the_ward_of_their_unit() {
    let conn = seeded();
    let households = scalar(&conn, "SELECT COUNT(*) FROM households");
    assert!((1..=2_000).contains(&households));
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM households h JOIN community_units u ON u.id = h.community_unit_id
             WHERE h.ward_id <> u.ward_id"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM (SELECT 1 FROM persons WHERE is_household_head = 1
             GROUP BY household_id HAVING COUNT(*) > 1)"
        ),
        0
    );
}

#[test]
fn stock_batches_are_unique_and_never_negative() {
    let conn = seeded();
    let duplicates: i64 = scalar(
        &conn,
        "SELECT COUNT(*) FROM (SELECT 1 FROM stocks
         GROUP BY commodity_id, facility_id, batch_number HAVING COUNT(*) > 1)",
    );
    assert_eq!(duplicates, 0);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM stocks WHERE quantity < 0"), 0);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM stocks"), 100);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM stock_transactions"), 200);
}

#[test]
fn edd_is_lmp_plus_gestation() {
    let conn = seeded();
    let pregnancies = get_all_pregnancies(&conn).unwrap();
    assert!(!pregnancies.is_empty());
    for p in &pregnancies {
        assert_eq!(p.edd, p.lmp_date + Duration::days(GESTATION_DAYS));
        match p.delivery_date {
            Some(delivered) => {
                assert!(delivered <= today());
                assert!(!p.is_active);
                assert_eq!(p.delivery_outcome.as_deref(), Some("Live Birth"));
            }
            None => assert!(p.edd > today()),
        }
    }
}

#[test]
fn anc_and_pnc_visits_are_never_in_the_future() {
    let conn = seeded();
    for p in get_all_pregnancies(&conn).unwrap() {
        for visit in get_anc_visits(&conn, &p.id).unwrap() {
            assert!(visit.visit_date <= today());
            assert!(visit.visit_number <= p.anc_visits_completed);
            assert_eq!(visit.gestation_weeks, 12 + (visit.visit_number - 1) * 8);
        }
        let pnc = get_pnc_visits(&conn, &p.id).unwrap();
        if p.delivery_date.is_none() {
            assert!(pnc.is_empty());
        }
        for visit in pnc {
            assert!(visit.visit_date <= today());
            assert!(PNC_SCHEDULE_DAYS.contains(&i64::from(visit.days_postpartum)));
        }
    }
}

#[test]
fn immunizations_respect_minimum_age_and_today() {
    let conn = seeded();
    let children: Vec<Uuid> = {
        let mut stmt = conn
            .prepare("SELECT DISTINCT child_id FROM immunization_records")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
        rows.map(|id| Uuid::parse_str(&id.unwrap()).unwrap()).collect()
    };
    assert!(!children.is_empty());

    for child_id in children {
        let dob = get_person(&conn, &child_id).unwrap().unwrap().date_of_birth;
        assert!(today() - dob < Duration::days(5 * 366));
        let doses = get_immunizations_for_child(&conn, &child_id).unwrap();
        assert!(!doses.is_empty());
        for record in &doses {
            let dose = IMMUNIZATION_SCHEDULE
                .iter()
                .find(|d| d.code == record.vaccine_code)
                .unwrap();
            assert_eq!(record.dose_number, dose.dose);
            assert!(
                record.administration_date >= dose.earliest_date(dob),
                "{} given too early",
                record.vaccine_code
            );
            assert!(record.administration_date <= today());
        }
        assert!(doses
            .windows(2)
            .all(|w| w[0].administration_date <= w[1].administration_date));
    }
}

#[test]
fn deaths_are_consistent_with_persons() {
    let conn = seeded();
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM mortality_reports"), 10);
    assert_eq!(
        scalar(&conn, "SELECT COUNT(*) FROM persons WHERE is_alive = 0"),
        10
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM persons WHERE date_of_death < date_of_birth"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM mortality_reports
             WHERE pregnancy_related <> (death_category = 'MATERNAL')"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM mortality_reports m JOIN persons p ON p.id = m.deceased_person_id
             WHERE m.date_of_death <> p.date_of_death"
        ),
        0
    );
}

#[test]
fn referral_timestamps_follow_status() {
    let conn = seeded();
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM referrals WHERE status = 'PENDING' AND accepted_date IS NOT NULL"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM referrals
             WHERE status = 'COMPLETED' AND (completion_date IS NULL OR arrival_date IS NULL)"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM referrals r JOIN facilities f ON f.id = r.to_facility_id
             WHERE f.facility_type NOT IN ('COUNTY_REFERRAL', 'SUB_COUNTY_HOSPITAL')"
        ),
        0
    );
    assert_eq!(
        scalar(&conn, "SELECT COUNT(*) FROM referrals WHERE status <> 'PENDING'"),
        scalar(&conn, "SELECT COUNT(*) FROM referral_follow_ups")
    );
}

#[test]
fn screenings_needing_follow_up_have_a_date() {
    let conn = seeded();
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM screenings WHERE follow_up_required = 1 AND follow_up_date IS NULL"
        ),
        0
    );
}

#[test]
fn seeded_accounts_share_the_password() {
    let conn = seeded();
    let hash: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE email = 'admin@wajir.health.go.ke'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(verify_password("password123", &hash).unwrap());
    assert!(!verify_password("password124", &hash).unwrap());
    assert_eq!(
        scalar(&conn, "SELECT COUNT(DISTINCT password_hash) FROM users"),
        1
    );
}

#[test]
fn rerun_replaces_instead_of_appending() {
    let conn = open_memory_database().unwrap();
    let first = run_seed(&conn, &config(2019)).unwrap();
    let second = run_seed(&conn, &config(2019)).unwrap();
    assert_eq!(first, second);
    assert_eq!(table_counts(&conn).unwrap(), second.counts);
}

#[test]
fn same_seed_same_dataset() {
    let a = seeded();
    let b = seeded();
    for table in ["persons", "households", "referrals", "lab_results"] {
        assert_eq!(ids(&a, table), ids(&b, table), "{table} differs");
    }

    let c = open_memory_database().unwrap();
    run_seed(&c, &config(2020)).unwrap();
    assert_ne!(ids(&a, "persons"), ids(&c, "persons"));
}

#[test]
fn seeding_on_disk_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("wajir_hmis.db");
    let summary = {
        let conn = open_database(&path).unwrap();
        run_seed(&conn, &config(2019)).unwrap()
    };

    let reopened = open_database(&path).unwrap();
    assert_eq!(table_counts(&reopened).unwrap(), summary.counts);
    let stats = fetch_dashboard_stats(&reopened, today()).unwrap();
    assert_eq!(stats.operational_facilities, 25);
    assert!(stats.living_persons > 0);
}
