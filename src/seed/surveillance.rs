use chrono::Duration;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, SeedContext};
use super::derive::{age_in_years, mortality_category, sequence_number};
use super::error::SeedError;
use crate::db::{insert_mortality_report, insert_surveillance_report, mark_person_deceased};
use crate::models::enums::{DeathCategory, SurveillanceSource};
use crate::models::*;

/// (disease, ICD code)
const DISEASES: [(&str, &str); 5] = [
    ("Malaria", "P51"),
    ("Acute Watery Diarrhea", "A09"),
    ("Measles", "B05"),
    ("Tuberculosis", "A15"),
    ("Cholera", "A00"),
];

const SOURCES: [SurveillanceSource; 3] = [
    SurveillanceSource::Facility,
    SurveillanceSource::Chv,
    SurveillanceSource::Laboratory,
];

const SURVEILLANCE_REPORTS: usize = 20;
const MORTALITY_REPORTS: usize = 10;

const PLACES_OF_DEATH: [&str; 3] = ["Home", "Facility", "Transit"];
const CAUSES_OF_DEATH: [&str; 5] = [
    "Respiratory Failure",
    "Severe Malaria",
    "Complications of Childbirth",
    "Pneumonia",
    "Diarrheal Disease",
];

/// Weekly disease reports over the last six months.
pub fn seed_surveillance_reports(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    for n in 1..=SURVEILLANCE_REPORTS {
        let (disease, code) = *pick(&mut ctx.rng, &DISEASES, "diseases")?;
        let report_date = ctx.today - Duration::days(ctx.rng.gen_range(1..=180));
        let outbreak_declared = ctx.rng.gen_bool(0.5);
        let response_initiated = ctx.rng.gen_bool(0.5);
        let report = SurveillanceReport {
            id: ctx.new_id(),
            report_number: sequence_number("SURV-WJR-", n, 5),
            disease_name: disease.into(),
            disease_code: Some(code.into()),
            report_date,
            reporting_period_start: report_date - Duration::days(7),
            reporting_period_end: report_date,
            ward_id: ctx.random_ward_id()?,
            facility_id: Some(ctx.random_facility_id()?),
            source: *pick(&mut ctx.rng, &SOURCES, "surveillance sources")?,
            reported_by_id: Some(ctx.random_user_id()?),
            cases_suspected: ctx.rng.gen_range(5..=50),
            cases_confirmed: ctx.rng.gen_range(2..=30),
            deaths: ctx.rng.gen_range(0..=3),
            cases_under_5: ctx.rng.gen_range(1..=15),
            cases_5_to_15: ctx.rng.gen_range(1..=10),
            cases_over_15: ctx.rng.gen_range(1..=20),
            males: ctx.rng.gen_range(5..=25),
            females: ctx.rng.gen_range(5..=25),
            outbreak_declared,
            response_initiated,
            response_details: response_initiated
                .then(|| "Rapid response team deployed; case management scaled up".to_string()),
            attachments: Vec::new(),
            notes: None,
        };
        insert_surveillance_report(conn, &report)?;
    }

    tracing::info!(rows = SURVEILLANCE_REPORTS, "Seeded surveillance reports");
    Ok(())
}

/// Deaths for a sample of registered persons. Each person is marked
/// deceased, with the death dated no earlier than their birth.
pub fn seed_mortality_reports(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let sampled: Vec<usize> = rand::seq::index::sample(
        &mut ctx.rng,
        ctx.persons.len(),
        MORTALITY_REPORTS.min(ctx.persons.len()),
    )
    .into_vec();
    let mut categories: Vec<DeathCategory> = Vec::with_capacity(sampled.len());

    for index in sampled {
        let (person_id, dob, gender, household_id) = {
            let p = &ctx.persons[index];
            (p.id, p.date_of_birth, p.gender, p.household_id)
        };
        let ward_id = ctx
            .households
            .iter()
            .find(|h| h.id == household_id)
            .map(|h| h.ward_id)
            .ok_or(SeedError::EmptyCollection { what: "households" })?;

        let date_of_death = (ctx.today - Duration::days(ctx.rng.gen_range(1..=365))).max(dob);
        mark_person_deceased(conn, &person_id, date_of_death)?;
        let person = &mut ctx.persons[index];
        person.is_alive = false;
        person.date_of_death = Some(date_of_death);

        let category = mortality_category(age_in_years(dob, date_of_death), gender, &mut ctx.rng);
        let maternal = category == DeathCategory::Maternal;
        let place = *pick(&mut ctx.rng, &PLACES_OF_DEATH, "places of death")?;
        let facility_id = if place == "Facility" {
            Some(ctx.random_facility_id()?)
        } else {
            None
        };
        let report = MortalityReport {
            id: ctx.new_id(),
            deceased_person_id: Some(person_id),
            death_category: category,
            date_of_death,
            place_of_death: place.into(),
            facility_id,
            ward_id,
            immediate_cause: pick(&mut ctx.rng, &CAUSES_OF_DEATH, "causes")?.to_string(),
            underlying_cause: Some(pick(&mut ctx.rng, &CAUSES_OF_DEATH, "causes")?.to_string()),
            contributing_factors: None,
            pregnancy_related: maternal,
            timing: maternal.then(|| "Postpartum".to_string()),
            reported_by_id: Some(ctx.random_user_id()?),
            report_date: date_of_death + Duration::days(ctx.rng.gen_range(1..=7)),
            autopsy_done: ctx.rng.gen_bool(0.5),
            autopsy_findings: None,
            death_certificate_issued: true,
            notes: None,
        };
        insert_mortality_report(conn, &report)?;
        categories.push(category);
    }

    let maternal = categories
        .iter()
        .filter(|c| **c == DeathCategory::Maternal)
        .count();
    tracing::info!(rows = categories.len(), maternal, "Seeded mortality reports");
    Ok(())
}
