use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, SeedContext};
use super::derive::sequence_number;
use super::error::SeedError;
use crate::db::{insert_lab_order, insert_lab_result, set_lab_order_status};
use crate::models::enums::{LabOrderStatus, RoleName};
use crate::models::*;

const LAB_ORDERS: usize = 40;

/// Facilities with a laboratory, in facility order.
const LAB_FACILITIES: usize = 10;

struct LabTest {
    name: &'static str,
    code: &'static str,
    unit: Option<&'static str>,
    reference_range: Option<&'static str>,
    /// Normal, abnormal and critical readings, in that order.
    readings: [&'static str; 3],
}

static TEST_PANEL: [LabTest; 4] = [
    LabTest {
        name: "Malaria RDT",
        code: "MRDT",
        unit: None,
        reference_range: Some("Negative"),
        readings: ["Negative", "Positive", "Positive (P. falciparum, high density)"],
    },
    LabTest {
        name: "Haemoglobin",
        code: "HB",
        unit: Some("g/dL"),
        reference_range: Some("11.5-16.5"),
        readings: ["12.8", "9.6", "5.9"],
    },
    LabTest {
        name: "Random Blood Sugar",
        code: "RBS",
        unit: Some("mmol/L"),
        reference_range: Some("3.9-7.8"),
        readings: ["5.4", "9.2", "22.1"],
    },
    LabTest {
        name: "HIV Rapid Test",
        code: "HIV",
        unit: None,
        reference_range: Some("Non-reactive"),
        readings: ["Non-reactive", "Reactive", "Reactive"],
    },
];

const RESULT_STATUSES: [&str; 3] = ["Normal", "Abnormal", "Critical"];
/// Relative odds of a normal, abnormal or critical reading.
const RESULT_WEIGHTS: [u32; 3] = [14, 5, 1];

/// Lab orders at facility laboratories. Orders whose sample was collected
/// get a result per requested test and are closed as completed.
pub fn seed_lab(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let lab_techs = ctx.user_ids_with_role(RoleName::LabTech);
    let clinicians = ctx.user_ids_with_role(RoleName::ClinicalOfficer);
    let facility_ids: Vec<_> = ctx
        .facilities
        .iter()
        .take(LAB_FACILITIES)
        .map(|f| f.id)
        .collect();
    let patient_ids: Vec<_> = ctx.persons.iter().filter(|p| p.is_alive).map(|p| p.id).collect();
    let outcomes = rand::distributions::WeightedIndex::new(RESULT_WEIGHTS)
        .map_err(|_| SeedError::EmptyCollection { what: "result weights" })?;
    let now = ctx.now();

    let mut results = 0;
    let mut completed = 0;
    for n in 1..=LAB_ORDERS {
        let test_count = ctx.rng.gen_range(1..=2);
        let tests: Vec<&LabTest> = TEST_PANEL.choose_multiple(&mut ctx.rng, test_count).collect();
        let order_date = now - Duration::days(ctx.rng.gen_range(1..=60));
        let collected = ctx.rng.gen_bool(0.8);
        let collector = *pick(&mut ctx.rng, &lab_techs, "lab technicians")?;
        let priority = if ctx.rng.gen_bool(0.2) { "URGENT" } else { "ROUTINE" };

        let order = LabTestOrder {
            id: ctx.new_id(),
            order_number: sequence_number("LAB-WJR-", n, 6),
            patient_id: *pick(&mut ctx.rng, &patient_ids, "patients")?,
            facility_id: *pick(&mut ctx.rng, &facility_ids, "lab facilities")?,
            ordered_by_id: Some(*pick(&mut ctx.rng, &clinicians, "clinical officers")?),
            order_date,
            tests_requested: tests.iter().map(|t| t.name.to_string()).collect(),
            clinical_notes: Some("Febrile illness, rule out malaria".into()),
            priority: priority.into(),
            status: if collected {
                LabOrderStatus::SampleCollected
            } else {
                LabOrderStatus::Pending
            },
            sample_collected_by_id: collected.then_some(collector),
            sample_collection_date: collected.then(|| order_date + Duration::minutes(30)),
        };
        insert_lab_order(conn, &order)?;
        if !collected {
            continue;
        }

        let test_date = order_date + Duration::hours(ctx.rng.gen_range(1..=6));
        for test in tests {
            let outcome = ctx.rng.sample(&outcomes);
            let result = LabResult {
                id: ctx.new_id(),
                lab_order_id: order.id,
                test_name: test.name.into(),
                test_code: Some(test.code.into()),
                result_value: test.readings[outcome].into(),
                unit: test.unit.map(str::to_string),
                reference_range: test.reference_range.map(str::to_string),
                result_status: RESULT_STATUSES[outcome].into(),
                tested_by_id: Some(collector),
                test_date,
                verified_by_id: Some(*pick(&mut ctx.rng, &lab_techs, "lab technicians")?),
                verification_date: Some(test_date + Duration::hours(1)),
                attachments: Vec::new(),
                notes: None,
            };
            insert_lab_result(conn, &result)?;
            results += 1;
        }
        set_lab_order_status(conn, &order.id, LabOrderStatus::Completed)?;
        completed += 1;
    }

    tracing::info!(orders = LAB_ORDERS, completed, results, "Seeded lab orders and results");
    Ok(())
}
