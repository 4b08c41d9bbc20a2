use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, opt_id, opt_uuid_col, uuid_col, FilterQuery};
use crate::db::DatabaseError;
use crate::models::enums::ReferralStatus;
use crate::models::*;

const REFERRAL_COLUMNS: &str = "id, referral_number, person_id, from_facility_id, to_facility_id,
    referred_by_id, referral_date, urgency, reason, diagnosis, treatment_given, status,
    accepted_by_id, accepted_date, arrival_date, completion_date, outcome,
    feedback_to_referring_facility";

pub fn insert_referral(conn: &Connection, r: &Referral) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO referrals ({REFERRAL_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            r.id.to_string(),
            r.referral_number,
            r.person_id.to_string(),
            opt_id(r.from_facility_id),
            opt_id(r.to_facility_id),
            opt_id(r.referred_by_id),
            r.referral_date,
            r.urgency.as_str(),
            r.reason,
            r.diagnosis,
            r.treatment_given,
            r.status.as_str(),
            opt_id(r.accepted_by_id),
            r.accepted_date,
            r.arrival_date,
            r.completion_date,
            r.outcome,
            r.feedback_to_referring_facility,
        ],
    )?;
    Ok(())
}

fn referral_from_row(row: &Row<'_>) -> rusqlite::Result<Referral> {
    Ok(Referral {
        id: uuid_col(row, 0)?,
        referral_number: row.get(1)?,
        person_id: uuid_col(row, 2)?,
        from_facility_id: opt_uuid_col(row, 3)?,
        to_facility_id: opt_uuid_col(row, 4)?,
        referred_by_id: opt_uuid_col(row, 5)?,
        referral_date: row.get(6)?,
        urgency: enum_col(row, 7)?,
        reason: row.get(8)?,
        diagnosis: row.get(9)?,
        treatment_given: row.get(10)?,
        status: enum_col(row, 11)?,
        accepted_by_id: opt_uuid_col(row, 12)?,
        accepted_date: row.get(13)?,
        arrival_date: row.get(14)?,
        completion_date: row.get(15)?,
        outcome: row.get(16)?,
        feedback_to_referring_facility: row.get(17)?,
    })
}

pub fn get_referral(conn: &Connection, id: &Uuid) -> Result<Option<Referral>, DatabaseError> {
    let referral = conn
        .query_row(
            &format!("SELECT {REFERRAL_COLUMNS} FROM referrals WHERE id = ?1"),
            [id.to_string()],
            referral_from_row,
        )
        .optional()?;
    Ok(referral)
}

pub fn list_referrals(
    conn: &Connection,
    filter: &ReferralFilter,
) -> Result<Vec<Referral>, DatabaseError> {
    let mut q = FilterQuery::default();
    if let Some(s) = filter.status {
        q.eq("status", s.as_str());
    }
    if let Some(u) = filter.urgency {
        q.eq("urgency", u.as_str());
    }
    if let Some(id) = filter.to_facility_id {
        q.eq("to_facility_id", id.to_string());
    }
    let sql = format!(
        "SELECT {REFERRAL_COLUMNS} FROM referrals WHERE 1=1{} ORDER BY referral_date DESC",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), referral_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Bulk "mark completed": sets status and completion time; already-completed
/// referrals keep their original completion time.
pub fn complete_referrals(
    conn: &Connection,
    ids: &[Uuid],
    completed_at: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "UPDATE referrals SET status = ?1, completion_date = COALESCE(completion_date, ?2)
         WHERE id = ?3",
    )?;
    let mut updated = 0;
    for id in ids {
        updated += stmt.execute(params![
            ReferralStatus::Completed.as_str(),
            completed_at,
            id.to_string()
        ])?;
    }
    tracing::info!(updated, "Referrals marked completed");
    Ok(updated)
}

pub fn cancel_referrals(conn: &Connection, ids: &[Uuid]) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare("UPDATE referrals SET status = ?1 WHERE id = ?2")?;
    let mut updated = 0;
    for id in ids {
        updated += stmt.execute(params![ReferralStatus::Cancelled.as_str(), id.to_string()])?;
    }
    tracing::info!(updated, "Referrals cancelled");
    Ok(updated)
}

pub fn insert_referral_follow_up(
    conn: &Connection,
    f: &ReferralFollowUp,
) -> Result<(), DatabaseError> {
    f.validate()?;
    conn.execute(
        "INSERT INTO referral_follow_ups (id, referral_id, follow_up_date, followed_up_by_id,
         status_update, notes, action_taken)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            f.id.to_string(),
            f.referral_id.to_string(),
            f.follow_up_date,
            opt_id(f.followed_up_by_id),
            f.status_update,
            f.notes,
            f.action_taken,
        ],
    )?;
    Ok(())
}

pub fn get_referral_follow_ups(
    conn: &Connection,
    referral_id: &Uuid,
) -> Result<Vec<ReferralFollowUp>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, referral_id, follow_up_date, followed_up_by_id, status_update, notes,
         action_taken
         FROM referral_follow_ups WHERE referral_id = ?1 ORDER BY follow_up_date",
    )?;
    let rows = stmt.query_map([referral_id.to_string()], |row| {
        Ok(ReferralFollowUp {
            id: uuid_col(row, 0)?,
            referral_id: uuid_col(row, 1)?,
            follow_up_date: row.get(2)?,
            followed_up_by_id: opt_uuid_col(row, 3)?,
            status_update: row.get(4)?,
            notes: row.get(5)?,
            action_taken: row.get(6)?,
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
    use crate::models::enums::*;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn setup(conn: &Connection) -> (Uuid, Uuid, Uuid) {
        let geo = fixtures::geo(conn);
        let from = fixtures::facility(conn, &geo, "DISP0110", FacilityType::Dispensary);
        let to = fixtures::facility(conn, &geo, "WCRH001", FacilityType::CountyReferral);
        let hh = fixtures::household(conn, &geo, "WJR-HH000001");
        let person = fixtures::person(
            conn,
            hh,
            "Habiba",
            Gender::Female,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        (person, from, to)
    }

    fn referral(number: &str, person: Uuid, from: Uuid, to: Uuid) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            referral_number: number.into(),
            person_id: person,
            from_facility_id: Some(from),
            to_facility_id: Some(to),
            referred_by_id: None,
            referral_date: at(1, 9),
            urgency: ReferralUrgency::Urgent,
            reason: "Severe malaria requiring admission".into(),
            diagnosis: Some("Severe Malaria".into()),
            treatment_given: None,
            status: ReferralStatus::Pending,
            accepted_by_id: None,
            accepted_date: None,
            arrival_date: None,
            completion_date: None,
            outcome: None,
            feedback_to_referring_facility: None,
        }
    }

    #[test]
    fn referral_number_unique() {
        let conn = open_memory_database().unwrap();
        let (p, from, to) = setup(&conn);
        insert_referral(&conn, &referral("REF-WJR-000001", p, from, to)).unwrap();
        let err = insert_referral(&conn, &referral("REF-WJR-000001", p, from, to)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn bulk_complete_and_cancel() {
        let conn = open_memory_database().unwrap();
        let (p, from, to) = setup(&conn);
        let a = referral("REF-WJR-000001", p, from, to);
        let b = referral("REF-WJR-000002", p, from, to);
        insert_referral(&conn, &a).unwrap();
        insert_referral(&conn, &b).unwrap();

        assert_eq!(complete_referrals(&conn, &[a.id], at(4, 12)).unwrap(), 1);
        // A second completion keeps the first timestamp.
        complete_referrals(&conn, &[a.id], at(9, 12)).unwrap();
        let done = get_referral(&conn, &a.id).unwrap().unwrap();
        assert_eq!(done.status, ReferralStatus::Completed);
        assert_eq!(done.completion_date, Some(at(4, 12)));

        assert_eq!(cancel_referrals(&conn, &[b.id]).unwrap(), 1);
        let pending = list_referrals(
            &conn,
            &ReferralFilter {
                status: Some(ReferralStatus::Pending),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn facility_delete_nulls_referral_ends() {
        let conn = open_memory_database().unwrap();
        let (p, from, to) = setup(&conn);
        let r = referral("REF-WJR-000001", p, from, to);
        insert_referral(&conn, &r).unwrap();
        conn.execute("DELETE FROM facilities WHERE id = ?1", [from.to_string()])
            .unwrap();
        let loaded = get_referral(&conn, &r.id).unwrap().unwrap();
        assert_eq!(loaded.from_facility_id, None);
        assert_eq!(loaded.to_facility_id, Some(to));
    }

    #[test]
    fn follow_ups_ordered_by_date() {
        let conn = open_memory_database().unwrap();
        let (p, from, to) = setup(&conn);
        let r = referral("REF-WJR-000001", p, from, to);
        insert_referral(&conn, &r).unwrap();
        for (i, days) in [3, 1].into_iter().enumerate() {
            insert_referral_follow_up(
                &conn,
                &ReferralFollowUp {
                    id: Uuid::new_v4(),
                    referral_id: r.id,
                    follow_up_date: r.referral_date + Duration::days(days),
                    followed_up_by_id: None,
                    status_update: format!("Update {i}"),
                    notes: None,
                    action_taken: None,
                },
            )
            .unwrap();
        }
        let ups = get_referral_follow_ups(&conn, &r.id).unwrap();
        assert_eq!(ups[0].status_update, "Update 1");
    }
}
