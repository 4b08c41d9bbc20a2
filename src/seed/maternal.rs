use chrono::Duration;
use rand::Rng;
use rusqlite::Connection;

use super::context::SeedContext;
use super::derive::{
    anc_visit_week, expected_delivery_date, IMMUNIZATION_SCHEDULE, PNC_SCHEDULE_DAYS,
};
use super::error::SeedError;
use crate::db::{insert_anc_visit, insert_immunization, insert_pnc_visit, insert_pregnancy};
use crate::models::enums::Gender;
use crate::models::*;

/// Women screened for a pregnancy record, in registration order.
const CANDIDATE_WOMEN: usize = 50;
const PREGNANCY_RATE: f64 = 0.3;

/// Children under five that get immunization records.
const IMMUNIZED_CHILDREN: usize = 100;

const ANC_TESTS: [&str; 3] = ["HIV Test", "Blood Group", "Urinalysis"];
const ANC_SUPPLEMENTS: [&str; 3] = ["Iron", "Folic Acid", "Calcium"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Pregnancies for a share of women aged 15 to 49. Those past their EDD
/// are closed with a live birth no later than today.
pub fn seed_pregnancies(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let today = ctx.today;
    let women: Vec<_> = ctx
        .persons
        .iter()
        .filter(|p| p.gender == Gender::Female && (15..=49).contains(&p.age_on(today)))
        .take(CANDIDATE_WOMEN)
        .map(|p| p.id)
        .collect();

    for woman_id in women {
        if !ctx.rng.gen_bool(PREGNANCY_RATE) {
            continue;
        }
        let lmp_date = today - Duration::days(ctx.rng.gen_range(30..=330));
        let edd = expected_delivery_date(lmp_date);
        let risk_factors = if ctx.rng.gen_bool(0.3) {
            strings(&["Anemia", "Previous C-Section"])
        } else {
            strings(&["None"])
        };

        let delivered = edd <= today;
        let (delivery_date, delivery_facility_id) = if delivered {
            let date = (edd + Duration::days(ctx.rng.gen_range(-7..=7))).min(today);
            (Some(date), Some(ctx.random_facility_id()?))
        } else {
            (None, None)
        };

        let pregnancy = PregnancyRecord {
            id: ctx.new_id(),
            woman_id,
            lmp_date,
            edd,
            gravida: ctx.rng.gen_range(1..=6),
            parity: ctx.rng.gen_range(0..=5),
            risk_factors,
            is_high_risk: ctx.rng.gen_bool(0.5),
            anc_visits_completed: ctx.rng.gen_range(0..=4),
            delivery_date,
            delivery_outcome: delivered.then(|| "Live Birth".to_string()),
            delivery_facility_id,
            is_active: !delivered,
            notes: None,
        };
        insert_pregnancy(conn, &pregnancy)?;
        ctx.pregnancies.push(pregnancy);
    }

    tracing::info!(rows = ctx.pregnancies.len(), "Seeded pregnancies");
    Ok(())
}

/// ANC visits at 12, 20, 28 and 36 weeks, up to the completed count and
/// never after today.
pub fn seed_anc_visits(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let pregnancies: Vec<_> = ctx
        .pregnancies
        .iter()
        .map(|p| (p.id, p.lmp_date, p.anc_visits_completed))
        .collect();
    let mut rows = 0;

    for (pregnancy_id, lmp_date, completed) in pregnancies {
        for visit_number in 1..=completed {
            let gestation_weeks = anc_visit_week(visit_number);
            let visit_date = lmp_date + Duration::weeks(gestation_weeks.into());
            if visit_date > ctx.today {
                break;
            }
            let visit = AncVisit {
                id: ctx.new_id(),
                pregnancy_id,
                visit_number,
                visit_date,
                gestation_weeks,
                facility_id: Some(ctx.random_facility_id()?),
                attended_by_id: Some(ctx.random_user_id()?),
                weight: Some(f64::from(ctx.rng.gen_range(55..=85_i32))),
                blood_pressure: Some(format!(
                    "{}/{}",
                    ctx.rng.gen_range(110..=140),
                    ctx.rng.gen_range(70..=90)
                )),
                hemoglobin: Some((ctx.rng.gen_range(9.5..13.5_f64) * 10.0).round() / 10.0),
                tests_done: strings(&ANC_TESTS),
                supplements_given: strings(&ANC_SUPPLEMENTS),
                next_visit_date: Some(visit_date + Duration::weeks(8)),
                notes: None,
            };
            insert_anc_visit(conn, &visit)?;
            rows += 1;
        }
    }

    tracing::info!(rows, "Seeded ANC visits");
    Ok(())
}

/// Postnatal checks on days 2, 7, 14 and 42 after each delivery, up to
/// today.
pub fn seed_pnc_visits(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let deliveries: Vec<_> = ctx
        .pregnancies
        .iter()
        .filter_map(|p| p.delivery_date.map(|d| (p.id, d, p.delivery_facility_id)))
        .collect();
    let mut rows = 0;

    for (pregnancy_id, delivery_date, facility_id) in deliveries {
        for (i, days) in PNC_SCHEDULE_DAYS.into_iter().enumerate() {
            let visit_date = delivery_date + Duration::days(days);
            if visit_date > ctx.today {
                break;
            }
            let next_visit_date = PNC_SCHEDULE_DAYS
                .get(i + 1)
                .map(|next| delivery_date + Duration::days(*next));
            let visit = PncVisit {
                id: ctx.new_id(),
                pregnancy_id,
                visit_number: i as i32 + 1,
                visit_date,
                days_postpartum: days as i32,
                facility_id,
                attended_by_id: Some(ctx.random_user_id()?),
                mother_condition: Some("Stable".into()),
                baby_condition: Some("Healthy".into()),
                breastfeeding_well: ctx.rng.gen_bool(0.85),
                family_planning_counselled: days >= 42 || ctx.rng.gen_bool(0.3),
                next_visit_date,
                notes: None,
            };
            insert_pnc_visit(conn, &visit)?;
            rows += 1;
        }
    }

    tracing::info!(rows, "Seeded PNC visits");
    Ok(())
}

/// EPI doses for children under five. A dose is recorded only once the
/// child is old enough, and never dated after today.
pub fn seed_immunizations(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let today = ctx.today;
    let children: Vec<_> = ctx
        .persons
        .iter()
        .filter(|p| p.age_on(today) < 5)
        .take(IMMUNIZED_CHILDREN)
        .map(|p| (p.id, p.date_of_birth, p.age_weeks_on(today)))
        .collect();
    let mut rows = 0;

    for (child_id, dob, age_weeks) in children {
        for dose in IMMUNIZATION_SCHEDULE.iter().filter(|d| d.is_due(age_weeks)) {
            let administration_date =
                dose.earliest_date(dob) + Duration::weeks(ctx.rng.gen_range(0..=4));
            if administration_date > today {
                tracing::debug!(vaccine = dose.code, %administration_date, "Dose not yet given");
                continue;
            }
            let record = ImmunizationRecord {
                id: ctx.new_id(),
                child_id,
                vaccine_name: dose.name.into(),
                vaccine_code: dose.code.into(),
                dose_number: dose.dose,
                administration_date,
                administered_by_id: Some(ctx.random_user_id()?),
                facility_id: Some(ctx.random_facility_id()?),
                batch_number: Some(format!("BATCH{}", ctx.rng.gen_range(1_000..=9_999))),
                expiry_date: Some(administration_date + Duration::days(365)),
                site: Some(if dose.dose == 1 { "Left Thigh" } else { "Right Thigh" }.into()),
                adverse_reaction: None,
                next_dose_date: None,
            };
            insert_immunization(conn, &record)?;
            rows += 1;
        }
    }

    tracing::info!(rows, "Seeded immunizations");
    Ok(())
}
