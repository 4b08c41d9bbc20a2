use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, opt_id, opt_uuid_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

const STAFF_COLUMNS: &str = "id, user_id, cadre, employee_number, qualification, institution,
    graduation_year, license_number, licensing_body, license_expiry, specialization,
    years_of_experience, primary_facility_id, employment_date, employment_status";

pub fn insert_staff_profile(conn: &Connection, s: &StaffProfile) -> Result<(), DatabaseError> {
    s.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO staff_profiles ({STAFF_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            s.id.to_string(),
            s.user_id.to_string(),
            s.cadre.as_str(),
            s.employee_number,
            s.qualification,
            s.institution,
            s.graduation_year,
            s.license_number,
            s.licensing_body,
            s.license_expiry,
            s.specialization,
            s.years_of_experience,
            opt_id(s.primary_facility_id),
            s.employment_date,
            s.employment_status,
        ],
    )?;
    Ok(())
}

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<StaffProfile> {
    Ok(StaffProfile {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        cadre: enum_col(row, 2)?,
        employee_number: row.get(3)?,
        qualification: row.get(4)?,
        institution: row.get(5)?,
        graduation_year: row.get(6)?,
        license_number: row.get(7)?,
        licensing_body: row.get(8)?,
        license_expiry: row.get(9)?,
        specialization: row.get(10)?,
        years_of_experience: row.get(11)?,
        primary_facility_id: opt_uuid_col(row, 12)?,
        employment_date: row.get(13)?,
        employment_status: row.get(14)?,
    })
}

pub fn get_staff_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<StaffProfile>, DatabaseError> {
    let staff = conn
        .query_row(
            &format!("SELECT {STAFF_COLUMNS} FROM staff_profiles WHERE user_id = ?1"),
            [user_id.to_string()],
            staff_from_row,
        )
        .optional()?;
    Ok(staff)
}

pub fn get_staff_at_facility(
    conn: &Connection,
    facility_id: &Uuid,
) -> Result<Vec<StaffProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STAFF_COLUMNS} FROM staff_profiles
         WHERE primary_facility_id = ?1 ORDER BY employee_number"
    ))?;
    let rows = stmt.query_map([facility_id.to_string()], staff_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_training(conn: &Connection, t: &Training) -> Result<(), DatabaseError> {
    t.validate()?;
    conn.execute(
        "INSERT INTO trainings (id, course_name, course_code, start_date, end_date, venue,
         trainer, training_organization, objectives, content_summary, budget, organized_by_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            t.id.to_string(),
            t.course_name,
            t.course_code,
            t.start_date,
            t.end_date,
            t.venue,
            t.trainer,
            t.training_organization,
            t.objectives,
            t.content_summary,
            t.budget,
            opt_id(t.organized_by_id),
        ],
    )?;
    Ok(())
}

pub fn insert_training_attendance(
    conn: &Connection,
    a: &TrainingAttendance,
) -> Result<(), DatabaseError> {
    a.validate()?;
    conn.execute(
        "INSERT INTO training_attendance (id, training_id, staff_id, attended,
         attendance_percentage, pre_test_score, post_test_score, certificate_issued,
         certificate_number, feedback)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            a.id.to_string(),
            a.training_id.to_string(),
            a.staff_id.to_string(),
            a.attended,
            a.attendance_percentage,
            a.pre_test_score,
            a.post_test_score,
            a.certificate_issued,
            a.certificate_number,
            a.feedback,
        ],
    )?;
    Ok(())
}

/// Staff who attended `training_id`, with their attendance rows.
pub fn get_training_attendees(
    conn: &Connection,
    training_id: &Uuid,
) -> Result<Vec<(StaffProfile, TrainingAttendance)>, DatabaseError> {
    let columns = STAFF_COLUMNS
        .split(',')
        .map(|c| format!("s.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {columns}, a.id, a.training_id, a.staff_id, a.attended,
         a.attendance_percentage, a.pre_test_score, a.post_test_score, a.certificate_issued,
         a.certificate_number, a.feedback
         FROM training_attendance a JOIN staff_profiles s ON s.id = a.staff_id
         WHERE a.training_id = ?1 ORDER BY s.employee_number"
    ))?;
    let rows = stmt.query_map([training_id.to_string()], |row| {
        let staff = staff_from_row(row)?;
        let attendance = TrainingAttendance {
            id: uuid_col(row, 15)?,
            training_id: uuid_col(row, 16)?,
            staff_id: uuid_col(row, 17)?,
            attended: row.get(18)?,
            attendance_percentage: row.get(19)?,
            pre_test_score: row.get(20)?,
            post_test_score: row.get(21)?,
            certificate_issued: row.get(22)?,
            certificate_number: row.get(23)?,
            feedback: row.get(24)?,
        };
        Ok((staff, attendance))
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}
