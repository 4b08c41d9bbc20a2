use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// County-wide headline figures for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub operational_facilities: i64,
    pub active_chvs: i64,
    pub active_households: i64,
    pub living_persons: i64,
    pub active_pregnancies: i64,
    pub pending_referrals: i64,
    pub visits_last_7_days: i64,
    pub screenings_last_30_days: i64,
    /// Stock batches below their commodity's reorder level.
    pub low_stock_items: i64,
    pub pending_lab_orders: i64,
}

fn count(conn: &Connection, sql: &str) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

pub fn fetch_dashboard_stats(
    conn: &Connection,
    today: NaiveDate,
) -> Result<DashboardStats, DatabaseError> {
    let visits_last_7_days = conn.query_row(
        "SELECT COUNT(*) FROM household_visits WHERE visit_date >= ?1 AND visit_date <= ?2",
        params![today - Duration::days(7), today],
        |row| row.get(0),
    )?;
    let screenings_last_30_days = conn.query_row(
        "SELECT COUNT(*) FROM screenings WHERE screening_date >= ?1 AND screening_date <= ?2",
        params![today - Duration::days(30), today],
        |row| row.get(0),
    )?;

    Ok(DashboardStats {
        operational_facilities: count(
            conn,
            "SELECT COUNT(*) FROM facilities WHERE is_operational = 1",
        )?,
        active_chvs: count(
            conn,
            "SELECT COUNT(*) FROM community_health_volunteers WHERE is_active = 1",
        )?,
        active_households: count(conn, "SELECT COUNT(*) FROM households WHERE is_active = 1")?,
        living_persons: count(conn, "SELECT COUNT(*) FROM persons WHERE is_alive = 1")?,
        active_pregnancies: count(
            conn,
            "SELECT COUNT(*) FROM pregnancy_records WHERE is_active = 1",
        )?,
        pending_referrals: count(
            conn,
            "SELECT COUNT(*) FROM referrals WHERE status = 'PENDING'",
        )?,
        visits_last_7_days,
        screenings_last_30_days,
        low_stock_items: count(
            conn,
            "SELECT COUNT(*) FROM stocks s JOIN commodities c ON c.id = s.commodity_id
             WHERE s.quantity < c.reorder_level",
        )?,
        pending_lab_orders: count(
            conn,
            "SELECT COUNT(*) FROM lab_test_orders WHERE status = 'PENDING'",
        )?,
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::{insert_household_visit, open_memory_database, set_facilities_operational};
    use crate::models::enums::*;
    use crate::models::*;

    #[test]
    fn empty_database_is_all_zero() {
        let conn = open_memory_database().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(fetch_dashboard_stats(&conn, today).unwrap(), DashboardStats::default());
    }

    #[test]
    fn counts_reflect_flags_and_windows() {
        let conn = open_memory_database().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let geo = fixtures::geo(&conn);
        fixtures::facility(&conn, &geo, "HC0100", FacilityType::HealthCentre);
        let closed = fixtures::facility(&conn, &geo, "DISP0101", FacilityType::Dispensary);
        set_facilities_operational(&conn, &[closed], false).unwrap();
        let hh = fixtures::household(&conn, &geo, "WJR-HH000001");
        let dob = NaiveDate::from_ymd_opt(1995, 1, 1).unwrap();
        fixtures::person(&conn, hh, "Nasra", Gender::Female, dob);

        for days_ago in [1, 6, 20] {
            insert_household_visit(
                &conn,
                &HouseholdVisit {
                    id: Uuid::new_v4(),
                    household_id: hh,
                    chv_id: None,
                    visit_date: today - Duration::days(days_ago),
                    visit_type: VisitType::Routine,
                    members_present: 2,
                    services_provided: vec![],
                    findings: None,
                    action_taken: None,
                    referrals_made: 0,
                    next_visit_date: None,
                },
            )
            .unwrap();
        }

        let stats = fetch_dashboard_stats(&conn, today).unwrap();
        assert_eq!(stats.operational_facilities, 1);
        assert_eq!(stats.active_households, 1);
        assert_eq!(stats.living_persons, 1);
        assert_eq!(stats.visits_last_7_days, 2);
        assert_eq!(stats.screenings_last_30_days, 0);
    }
}
