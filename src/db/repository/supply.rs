use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use super::{enum_col, json_col, opt_id, opt_uuid_col, to_json, uuid_col, FilterQuery};
use crate::db::DatabaseError;
use crate::models::validation::validate_min;
use crate::models::*;

const COMMODITY_COLUMNS: &str = "id, name, commodity_code, commodity_type, generic_name,
    dosage_form, strength, unit_of_measure, reorder_level, ideal_stock_level, is_essential,
    is_active";

const STOCK_COLUMNS: &str = "s.id, s.commodity_id, s.facility_id, s.quantity, s.batch_number,
    s.expiry_date, s.unit_cost, s.updated_by_id";

const PURCHASE_ORDER_COLUMNS: &str = "id, po_number, supplier_id, procurement_request_id,
    po_date, expected_delivery_date, actual_delivery_date, items, total_amount, vat_amount,
    status, created_by_id, approved_by_id, terms_and_conditions, notes";

/// A stock row joined with its commodity and classified against `today`.
#[derive(Debug, Clone, Serialize)]
pub struct StockOverview {
    pub stock: Stock,
    pub commodity_name: String,
    pub commodity_code: String,
    pub reorder_level: i32,
    pub status: StockStatus,
}

pub fn insert_commodity(conn: &Connection, c: &Commodity) -> Result<(), DatabaseError> {
    c.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO commodities ({COMMODITY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            c.id.to_string(),
            c.name,
            c.commodity_code,
            c.commodity_type.as_str(),
            c.generic_name,
            c.dosage_form,
            c.strength,
            c.unit_of_measure,
            c.reorder_level,
            c.ideal_stock_level,
            c.is_essential,
            c.is_active,
        ],
    )?;
    Ok(())
}

pub fn get_commodity_by_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<Commodity>, DatabaseError> {
    let commodity = conn
        .query_row(
            &format!("SELECT {COMMODITY_COLUMNS} FROM commodities WHERE commodity_code = ?1"),
            [code],
            |row| {
                Ok(Commodity {
                    id: uuid_col(row, 0)?,
                    name: row.get(1)?,
                    commodity_code: row.get(2)?,
                    commodity_type: enum_col(row, 3)?,
                    generic_name: row.get(4)?,
                    dosage_form: row.get(5)?,
                    strength: row.get(6)?,
                    unit_of_measure: row.get(7)?,
                    reorder_level: row.get(8)?,
                    ideal_stock_level: row.get(9)?,
                    is_essential: row.get(10)?,
                    is_active: row.get(11)?,
                })
            },
        )
        .optional()?;
    Ok(commodity)
}

pub fn insert_supplier(conn: &Connection, s: &Supplier) -> Result<(), DatabaseError> {
    s.validate()?;
    conn.execute(
        "INSERT INTO suppliers (id, name, supplier_code, contact_person, phone, email,
         physical_address, kra_pin, is_active, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            s.id.to_string(),
            s.name,
            s.supplier_code,
            s.contact_person,
            s.phone,
            s.email,
            s.physical_address,
            s.kra_pin,
            s.is_active,
            s.rating,
        ],
    )?;
    Ok(())
}

/// Fails with a foreign-key violation while purchase orders reference the supplier.
pub fn delete_supplier(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM suppliers WHERE id = ?1", [id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Supplier".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn insert_stock(conn: &Connection, s: &Stock) -> Result<(), DatabaseError> {
    s.validate()?;
    conn.execute(
        "INSERT INTO stocks (id, commodity_id, facility_id, quantity, batch_number, expiry_date,
         unit_cost, updated_by_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            s.id.to_string(),
            s.commodity_id.to_string(),
            s.facility_id.to_string(),
            s.quantity,
            s.batch_number,
            s.expiry_date,
            s.unit_cost,
            opt_id(s.updated_by_id),
        ],
    )?;
    Ok(())
}

fn stock_from_row(row: &Row<'_>) -> rusqlite::Result<Stock> {
    Ok(Stock {
        id: uuid_col(row, 0)?,
        commodity_id: uuid_col(row, 1)?,
        facility_id: uuid_col(row, 2)?,
        quantity: row.get(3)?,
        batch_number: row.get(4)?,
        expiry_date: row.get(5)?,
        unit_cost: row.get(6)?,
        updated_by_id: opt_uuid_col(row, 7)?,
    })
}

pub fn get_stock(conn: &Connection, id: &Uuid) -> Result<Option<Stock>, DatabaseError> {
    let stock = conn
        .query_row(
            &format!("SELECT {STOCK_COLUMNS} FROM stocks s WHERE s.id = ?1"),
            [id.to_string()],
            stock_from_row,
        )
        .optional()?;
    Ok(stock)
}

/// Stock rows matching `filter`, with expiry and level judged against `today`.
pub fn list_stocks(
    conn: &Connection,
    filter: &StockFilter,
    today: NaiveDate,
) -> Result<Vec<StockOverview>, DatabaseError> {
    let warn = today + Duration::days(EXPIRY_WARNING_DAYS);
    let mut q = FilterQuery::default();
    if let Some(id) = filter.facility_id {
        q.eq("s.facility_id", id.to_string());
    }
    if let Some(t) = filter.commodity_type {
        q.eq("c.commodity_type", t.as_str());
    }
    match filter.expiry {
        Some(ExpiryWindow::Expired) => q.with_param("s.expiry_date < {}", today),
        Some(ExpiryWindow::ExpiringSoon) => {
            q.with_param("s.expiry_date >= {}", today);
            q.with_param("s.expiry_date < {}", warn);
        }
        Some(ExpiryWindow::Valid) => q.with_param("s.expiry_date >= {}", warn),
        None => {}
    }
    match filter.level {
        Some(StockLevel::Out) => q.raw("s.quantity = 0"),
        Some(StockLevel::Low) => q.raw("s.quantity > 0 AND s.quantity < c.reorder_level"),
        Some(StockLevel::Adequate) => q.raw("s.quantity >= c.reorder_level"),
        None => {}
    }

    let sql = format!(
        "SELECT {STOCK_COLUMNS}, c.name, c.commodity_code, c.reorder_level
         FROM stocks s JOIN commodities c ON c.id = s.commodity_id
         WHERE 1=1{} ORDER BY s.expiry_date, c.commodity_code",
        q.sql_suffix()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(q.param_refs().as_slice(), |row| {
        let stock = stock_from_row(row)?;
        let reorder_level: i32 = row.get(10)?;
        let status = classify_stock(stock.quantity, stock.expiry_date, reorder_level, today);
        Ok(StockOverview {
            stock,
            commodity_name: row.get(8)?,
            commodity_code: row.get(9)?,
            reorder_level,
            status,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Records `txn` and applies its signed quantity to the stock row.
/// Returns the new quantity. A change that would leave the batch below
/// zero is rejected before anything is written. The log row and the
/// quantity change commit together; inside a caller's transaction they
/// join it instead.
pub fn apply_stock_transaction(
    conn: &Connection,
    txn: &StockTransaction,
) -> Result<i64, DatabaseError> {
    txn.validate()?;
    let tx = if conn.is_autocommit() {
        Some(conn.unchecked_transaction()?)
    } else {
        None
    };
    let current: Option<i64> = conn
        .query_row(
            "SELECT quantity FROM stocks WHERE id = ?1",
            [txn.stock_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let current = current.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Stock".into(),
        id: txn.stock_id.to_string(),
    })?;
    let updated = current + txn.quantity;
    validate_min("stock.quantity", updated, 0)?;

    conn.execute(
        "INSERT INTO stock_transactions (id, transaction_number, stock_id, transaction_type,
         quantity, transaction_date, from_facility_id, to_facility_id, reference_number,
         performed_by_id, approved_by_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            txn.id.to_string(),
            txn.transaction_number,
            txn.stock_id.to_string(),
            txn.transaction_type.as_str(),
            txn.quantity,
            txn.transaction_date,
            opt_id(txn.from_facility_id),
            opt_id(txn.to_facility_id),
            txn.reference_number,
            opt_id(txn.performed_by_id),
            opt_id(txn.approved_by_id),
            txn.notes,
        ],
    )?;
    conn.execute(
        "UPDATE stocks SET quantity = ?1, updated_by_id = COALESCE(?2, updated_by_id)
         WHERE id = ?3",
        params![updated, opt_id(txn.performed_by_id), txn.stock_id.to_string()],
    )?;
    if let Some(tx) = tx {
        tx.commit()?;
    }
    tracing::debug!(
        number = %txn.transaction_number,
        kind = %txn.transaction_type,
        from = current,
        to = updated,
        "Stock adjusted"
    );
    Ok(updated)
}

pub fn get_stock_transactions(
    conn: &Connection,
    stock_id: &Uuid,
) -> Result<Vec<StockTransaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, transaction_number, stock_id, transaction_type, quantity, transaction_date,
         from_facility_id, to_facility_id, reference_number, performed_by_id, approved_by_id,
         notes
         FROM stock_transactions WHERE stock_id = ?1 ORDER BY transaction_date",
    )?;
    let rows = stmt.query_map([stock_id.to_string()], |row| {
        Ok(StockTransaction {
            id: uuid_col(row, 0)?,
            transaction_number: row.get(1)?,
            stock_id: uuid_col(row, 2)?,
            transaction_type: enum_col(row, 3)?,
            quantity: row.get(4)?,
            transaction_date: row.get(5)?,
            from_facility_id: opt_uuid_col(row, 6)?,
            to_facility_id: opt_uuid_col(row, 7)?,
            reference_number: row.get(8)?,
            performed_by_id: opt_uuid_col(row, 9)?,
            approved_by_id: opt_uuid_col(row, 10)?,
            notes: row.get(11)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_procurement_request(
    conn: &Connection,
    r: &ProcurementRequest,
) -> Result<(), DatabaseError> {
    r.validate()?;
    conn.execute(
        "INSERT INTO procurement_requests (id, request_number, facility_id, requested_by_id,
         request_date, items, justification, priority, status, reviewed_by_id, review_date,
         review_notes, approved_by_id, approval_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            r.id.to_string(),
            r.request_number,
            r.facility_id.to_string(),
            opt_id(r.requested_by_id),
            r.request_date,
            to_json(&r.items)?,
            r.justification,
            r.priority,
            r.status.as_str(),
            opt_id(r.reviewed_by_id),
            r.review_date,
            r.review_notes,
            opt_id(r.approved_by_id),
            r.approval_date,
        ],
    )?;
    Ok(())
}

pub fn get_procurement_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ProcurementRequest>, DatabaseError> {
    let request = conn
        .query_row(
            "SELECT id, request_number, facility_id, requested_by_id, request_date, items,
             justification, priority, status, reviewed_by_id, review_date, review_notes,
             approved_by_id, approval_date
             FROM procurement_requests WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok(ProcurementRequest {
                    id: uuid_col(row, 0)?,
                    request_number: row.get(1)?,
                    facility_id: uuid_col(row, 2)?,
                    requested_by_id: opt_uuid_col(row, 3)?,
                    request_date: row.get(4)?,
                    items: json_col(row, 5)?,
                    justification: row.get(6)?,
                    priority: row.get(7)?,
                    status: enum_col(row, 8)?,
                    reviewed_by_id: opt_uuid_col(row, 9)?,
                    review_date: row.get(10)?,
                    review_notes: row.get(11)?,
                    approved_by_id: opt_uuid_col(row, 12)?,
                    approval_date: row.get(13)?,
                })
            },
        )
        .optional()?;
    Ok(request)
}

pub fn insert_purchase_order(conn: &Connection, po: &PurchaseOrder) -> Result<(), DatabaseError> {
    po.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO purchase_orders ({PURCHASE_ORDER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            po.id.to_string(),
            po.po_number,
            po.supplier_id.to_string(),
            opt_id(po.procurement_request_id),
            po.po_date,
            po.expected_delivery_date,
            po.actual_delivery_date,
            to_json(&po.items)?,
            po.total_amount,
            po.vat_amount,
            po.status.as_str(),
            opt_id(po.created_by_id),
            opt_id(po.approved_by_id),
            po.terms_and_conditions,
            po.notes,
        ],
    )?;
    Ok(())
}

pub fn get_purchase_orders_for_supplier(
    conn: &Connection,
    supplier_id: &Uuid,
) -> Result<Vec<PurchaseOrder>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders
         WHERE supplier_id = ?1 ORDER BY po_date DESC"
    ))?;
    let rows = stmt.query_map([supplier_id.to_string()], |row| {
        Ok(PurchaseOrder {
            id: uuid_col(row, 0)?,
            po_number: row.get(1)?,
            supplier_id: uuid_col(row, 2)?,
            procurement_request_id: opt_uuid_col(row, 3)?,
            po_date: row.get(4)?,
            expected_delivery_date: row.get(5)?,
            actual_delivery_date: row.get(6)?,
            items: json_col(row, 7)?,
            total_amount: row.get(8)?,
            vat_amount: row.get(9)?,
            status: enum_col(row, 10)?,
            created_by_id: opt_uuid_col(row, 11)?,
            approved_by_id: opt_uuid_col(row, 12)?,
            terms_and_conditions: row.get(13)?,
            notes: row.get(14)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}
