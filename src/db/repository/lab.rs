use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col};
use crate::db::DatabaseError;
use crate::models::enums::LabOrderStatus;
use crate::models::*;

const LAB_ORDER_COLUMNS: &str = "id, order_number, patient_id, facility_id, ordered_by_id,
    order_date, tests_requested, clinical_notes, priority, status, sample_collected_by_id,
    sample_collection_date";

const LAB_RESULT_COLUMNS: &str = "id, lab_order_id, test_name, test_code, result_value, unit,
    reference_range, result_status, tested_by_id, test_date, verified_by_id, verification_date,
    attachments, notes";

pub fn insert_lab_order(conn: &Connection, o: &LabTestOrder) -> Result<(), DatabaseError> {
    o.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO lab_test_orders ({LAB_ORDER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            o.id.to_string(),
            o.order_number,
            o.patient_id.to_string(),
            o.facility_id.to_string(),
            opt_id(o.ordered_by_id),
            o.order_date,
            to_json(&o.tests_requested)?,
            o.clinical_notes,
            o.priority,
            o.status.as_str(),
            opt_id(o.sample_collected_by_id),
            o.sample_collection_date,
        ],
    )?;
    Ok(())
}

fn lab_order_from_row(row: &Row<'_>) -> rusqlite::Result<LabTestOrder> {
    Ok(LabTestOrder {
        id: uuid_col(row, 0)?,
        order_number: row.get(1)?,
        patient_id: uuid_col(row, 2)?,
        facility_id: uuid_col(row, 3)?,
        ordered_by_id: opt_uuid_col(row, 4)?,
        order_date: row.get(5)?,
        tests_requested: json_col(row, 6)?,
        clinical_notes: row.get(7)?,
        priority: row.get(8)?,
        status: enum_col(row, 9)?,
        sample_collected_by_id: opt_uuid_col(row, 10)?,
        sample_collection_date: row.get(11)?,
    })
}

pub fn get_lab_order(conn: &Connection, id: &Uuid) -> Result<Option<LabTestOrder>, DatabaseError> {
    let order = conn
        .query_row(
            &format!("SELECT {LAB_ORDER_COLUMNS} FROM lab_test_orders WHERE id = ?1"),
            [id.to_string()],
            lab_order_from_row,
        )
        .optional()?;
    Ok(order)
}

pub fn get_lab_orders_by_status(
    conn: &Connection,
    status: LabOrderStatus,
) -> Result<Vec<LabTestOrder>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LAB_ORDER_COLUMNS} FROM lab_test_orders WHERE status = ?1 ORDER BY order_date"
    ))?;
    let rows = stmt.query_map([status.as_str()], lab_order_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn set_lab_order_status(
    conn: &Connection,
    id: &Uuid,
    status: LabOrderStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE lab_test_orders SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "LabTestOrder".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn insert_lab_result(conn: &Connection, r: &LabResult) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO lab_results ({LAB_RESULT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            r.id.to_string(),
            r.lab_order_id.to_string(),
            r.test_name,
            r.test_code,
            r.result_value,
            r.unit,
            r.reference_range,
            r.result_status,
            opt_id(r.tested_by_id),
            r.test_date,
            opt_id(r.verified_by_id),
            r.verification_date,
            to_json(&r.attachments)?,
            r.notes,
        ],
    )?;
    Ok(())
}

pub fn get_lab_results(conn: &Connection, order_id: &Uuid) -> Result<Vec<LabResult>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LAB_RESULT_COLUMNS} FROM lab_results WHERE lab_order_id = ?1 ORDER BY test_name"
    ))?;
    let rows = stmt.query_map([order_id.to_string()], |row| {
        Ok(LabResult {
            id: uuid_col(row, 0)?,
            lab_order_id: uuid_col(row, 1)?,
            test_name: row.get(2)?,
            test_code: row.get(3)?,
            result_value: row.get(4)?,
            unit: row.get(5)?,
            reference_range: row.get(6)?,
            result_status: row.get(7)?,
            tested_by_id: opt_uuid_col(row, 8)?,
            test_date: row.get(9)?,
            verified_by_id: opt_uuid_col(row, 10)?,
            verification_date: row.get(11)?,
            attachments: json_col(row, 12)?,
            notes: row.get(13)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}
