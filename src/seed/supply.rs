use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, SeedContext};
use super::derive::{round_cents, sequence_number};
use super::error::SeedError;
use crate::db::{
    apply_stock_transaction, insert_commodity, insert_procurement_request, insert_purchase_order,
    insert_stock, insert_supplier,
};
use crate::models::enums::{
    CommodityType, ProcurementStatus, PurchaseOrderStatus, RoleName, TransactionType,
};
use crate::models::*;

/// (name, code, type, generic name, dosage form, strength, unit)
const COMMODITIES: [(&str, &str, CommodityType, &str, &str, &str, &str); 10] = [
    ("Paracetamol 500mg", "PARA500", CommodityType::Medicine, "Paracetamol", "Tablet", "500mg", "Tablets"),
    ("Amoxicillin 250mg", "AMOX250", CommodityType::Medicine, "Amoxicillin", "Capsule", "250mg", "Capsules"),
    ("Artemether/Lumefantrine (AL)", "AL", CommodityType::Medicine, "AL", "Tablet", "20/120mg", "Tablets"),
    ("ORS Sachets", "ORS", CommodityType::Medicine, "ORS", "Powder", "", "Sachets"),
    ("Measles Vaccine", "MEASLES", CommodityType::Vaccine, "Measles", "Injection", "", "Vials"),
    ("BCG Vaccine", "BCG", CommodityType::Vaccine, "BCG", "Injection", "", "Vials"),
    ("Pentavalent Vaccine", "PENTA", CommodityType::Vaccine, "Pentavalent", "Injection", "", "Vials"),
    ("Gloves (Surgical)", "GLOVE-S", CommodityType::Supply, "", "", "", "Pairs"),
    ("Syringes 5ml", "SYR5", CommodityType::Supply, "", "", "5ml", "Pieces"),
    ("HIV Test Kits", "HIV-TEST", CommodityType::Reagent, "", "", "", "Tests"),
];

/// (name, code, contact person, phone, email)
const SUPPLIERS: [(&str, &str, &str, &str, &str); 3] = [
    ("KEMSA", "KEMSA", "John Kamau", "+254722111111", "orders@kemsa.co.ke"),
    ("Dawa Ltd", "DAWA", "Mary Njeri", "+254722222222", "sales@dawaltd.co.ke"),
    ("MedSupply Kenya", "MEDSUP", "Peter Otieno", "+254722333333", "info@medsupply.co.ke"),
];

/// Facilities that hold stock of every commodity.
const STOCKED_FACILITIES: usize = 10;

/// Facilities that raise procurement requests.
const REQUESTING_FACILITIES: usize = 5;

const VAT_RATE: f64 = 0.16;

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Commodities, suppliers and one stock batch per commodity at each
/// stocked facility.
pub fn seed_supply(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    for (name, code, commodity_type, generic, form, strength, unit) in COMMODITIES {
        let commodity = Commodity {
            id: ctx.new_id(),
            name: name.into(),
            commodity_code: code.into(),
            commodity_type,
            generic_name: non_empty(generic),
            dosage_form: non_empty(form),
            strength: non_empty(strength),
            unit_of_measure: unit.into(),
            reorder_level: ctx.rng.gen_range(100..=500),
            ideal_stock_level: ctx.rng.gen_range(1_000..=5_000),
            is_essential: ctx.rng.gen_bool(0.5),
            is_active: true,
        };
        insert_commodity(conn, &commodity)?;
        ctx.commodities.push(commodity);
    }

    for (name, code, contact, phone, email) in SUPPLIERS {
        let supplier = Supplier {
            id: ctx.new_id(),
            name: name.into(),
            supplier_code: code.into(),
            contact_person: contact.into(),
            phone: phone.into(),
            email: email.into(),
            physical_address: "Nairobi, Kenya".into(),
            kra_pin: None,
            is_active: true,
            rating: None,
        };
        insert_supplier(conn, &supplier)?;
        ctx.suppliers.push(supplier);
    }

    // Each (commodity, facility) pair gets a single batch, so batch numbers
    // cannot collide within a pair.
    let facility_ids: Vec<_> = ctx
        .facilities
        .iter()
        .take(STOCKED_FACILITIES)
        .map(|f| f.id)
        .collect();
    let commodity_ids: Vec<_> = ctx.commodities.iter().map(|c| c.id).collect();
    for facility_id in &facility_ids {
        for commodity_id in &commodity_ids {
            let stock = Stock {
                id: ctx.new_id(),
                commodity_id: *commodity_id,
                facility_id: *facility_id,
                quantity: ctx.rng.gen_range(50..=1_000),
                batch_number: format!("BATCH{}", ctx.rng.gen_range(1_000..=9_999)),
                expiry_date: ctx.today + Duration::days(ctx.rng.gen_range(180..=730)),
                unit_cost: Some(round_cents(ctx.rng.gen_range(5.0..500.0))),
                updated_by_id: Some(ctx.random_user_id()?),
            };
            insert_stock(conn, &stock)?;
            ctx.stocks.push(stock);
        }
    }

    tracing::info!(
        commodities = ctx.commodities.len(),
        suppliers = ctx.suppliers.len(),
        stocks = ctx.stocks.len(),
        "Seeded commodities, suppliers and stock"
    );
    Ok(())
}

/// A goods receipt and a dispensing issue against every batch, applied
/// through the stock ledger so quantities stay consistent.
pub fn seed_stock_transactions(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let pharmacists = ctx.user_ids_with_role(RoleName::Pharmacist);
    let now = ctx.now();
    let mut counter = 1;

    for i in 0..ctx.stocks.len() {
        let (stock_id, facility_id, quantity) = {
            let s = &ctx.stocks[i];
            (s.id, s.facility_id, s.quantity)
        };
        let performed_by = *pick(&mut ctx.rng, &pharmacists, "pharmacists")?;

        let received = ctx.rng.gen_range(100..=500);
        let receipt = StockTransaction {
            id: ctx.new_id(),
            transaction_number: sequence_number("TXN-WJR-", counter, 6),
            stock_id,
            transaction_type: TransactionType::In,
            quantity: received,
            transaction_date: now - Duration::days(ctx.rng.gen_range(30..=60)),
            from_facility_id: None,
            to_facility_id: Some(facility_id),
            reference_number: Some(sequence_number("GRN-WJR-", counter, 6)),
            performed_by_id: Some(performed_by),
            approved_by_id: None,
            notes: Some("Quarterly KEMSA delivery".into()),
        };
        apply_stock_transaction(conn, &receipt)?;
        counter += 1;

        let issued = ctx.rng.gen_range(1..=(quantity + received) / 2);
        let issue = StockTransaction {
            id: ctx.new_id(),
            transaction_number: sequence_number("TXN-WJR-", counter, 6),
            stock_id,
            transaction_type: TransactionType::Out,
            quantity: -issued,
            transaction_date: now - Duration::days(ctx.rng.gen_range(1..=29)),
            from_facility_id: Some(facility_id),
            to_facility_id: None,
            reference_number: None,
            performed_by_id: Some(performed_by),
            approved_by_id: None,
            notes: Some("Issued to dispensing".into()),
        };
        ctx.stocks[i].quantity = apply_stock_transaction(conn, &issue)?;
        counter += 1;
    }

    tracing::info!(rows = counter - 1, "Seeded stock transactions");
    Ok(())
}

/// Procurement requests from the first facilities. Requests that reached
/// ORDERED get a purchase order with a random supplier.
pub fn seed_procurement(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let admin = ctx
        .user_ids_with_role(RoleName::CountyAdmin)
        .first()
        .copied()
        .ok_or(SeedError::EmptyCollection { what: "county admins" })?;
    let managers = ctx.user_ids_with_role(RoleName::FacilityManager);
    let facility_ids: Vec<_> = ctx
        .facilities
        .iter()
        .take(REQUESTING_FACILITIES)
        .map(|f| f.id)
        .collect();
    let now = ctx.now();
    let statuses = [
        ProcurementStatus::Submitted,
        ProcurementStatus::Approved,
        ProcurementStatus::Ordered,
    ];

    let mut requests = 0;
    let mut orders = 0;
    for (i, facility_id) in facility_ids.into_iter().enumerate() {
        let count = ctx.rng.gen_range(2..=3);
        let items: Vec<ProcurementItem> = ctx
            .commodities
            .choose_multiple(&mut ctx.rng, count)
            .map(|c| ProcurementItem {
                commodity_id: c.id,
                quantity: i64::from(c.ideal_stock_level / 2).max(1),
                justification: "Replenish to ideal stock level".into(),
            })
            .collect();
        if items.is_empty() {
            return Err(SeedError::EmptyCollection { what: "commodities" });
        }

        let status = *pick(&mut ctx.rng, &statuses, "procurement statuses")?;
        let request_date = ctx.today - Duration::days(ctx.rng.gen_range(14..=60));
        let reviewed = status != ProcurementStatus::Submitted;
        let review_date = now - Duration::days(ctx.rng.gen_range(1..=13));
        let priority = if ctx.rng.gen_bool(0.3) { "URGENT" } else { "NORMAL" };
        let request = ProcurementRequest {
            id: ctx.new_id(),
            request_number: sequence_number("PR-WJR-", i + 1, 5),
            facility_id,
            requested_by_id: Some(*pick(&mut ctx.rng, &managers, "facility managers")?),
            request_date,
            items,
            justification: "Stock below reorder level ahead of rainy season".into(),
            priority: priority.into(),
            status,
            reviewed_by_id: reviewed.then_some(admin),
            review_date: reviewed.then_some(review_date),
            review_notes: reviewed.then(|| "Quantities verified against consumption".to_string()),
            approved_by_id: reviewed.then_some(admin),
            approval_date: reviewed.then_some(review_date),
        };
        insert_procurement_request(conn, &request)?;
        requests += 1;

        if status == ProcurementStatus::Ordered {
            orders += 1;
            let supplier_id = pick(&mut ctx.rng, &ctx.suppliers, "suppliers")?.id;
            let mut po_items = Vec::with_capacity(request.items.len());
            for item in &request.items {
                po_items.push(PurchaseOrderItem {
                    commodity_id: item.commodity_id,
                    quantity: item.quantity,
                    unit_price: round_cents(ctx.rng.gen_range(5.0..500.0)),
                });
            }
            let subtotal: f64 = po_items
                .iter()
                .map(|p| p.unit_price * p.quantity as f64)
                .sum();
            let po_date = review_date.date();
            let delivered = ctx.rng.gen_bool(0.5);
            let expected = po_date + Duration::days(14);
            let order = PurchaseOrder {
                id: ctx.new_id(),
                po_number: sequence_number("PO-WJR-", orders, 5),
                supplier_id,
                procurement_request_id: Some(request.id),
                po_date,
                expected_delivery_date: expected,
                actual_delivery_date: delivered.then(|| expected.min(ctx.today)),
                items: po_items,
                total_amount: round_cents(subtotal),
                vat_amount: round_cents(subtotal * VAT_RATE),
                status: if delivered {
                    PurchaseOrderStatus::Delivered
                } else {
                    PurchaseOrderStatus::Sent
                },
                created_by_id: Some(admin),
                approved_by_id: Some(admin),
                terms_and_conditions: Some("Delivery within 14 days of order".into()),
                notes: None,
            };
            insert_purchase_order(conn, &order)?;
        }
    }

    tracing::info!(requests, orders, "Seeded procurement");
    Ok(())
}
