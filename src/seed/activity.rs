use std::collections::BTreeMap;

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, SeedContext};
use super::error::SeedError;
use crate::db::{insert_household_visit, insert_outreach_event, insert_screening};
use crate::models::enums::{OutreachEventType, ScreeningResult, ScreeningType, VisitType};
use crate::models::*;

/// Households visited by their CHV, in registration order.
const VISITED_HOUSEHOLDS: usize = 200;

const VISIT_TYPES: [VisitType; 3] = [VisitType::Routine, VisitType::FollowUp, VisitType::ReferralCheck];
const VISIT_SERVICES: [&str; 6] = [
    "Health Education",
    "Malaria Prevention",
    "Child Growth Monitoring",
    "Immunization Reminder",
    "ANC Follow-up",
    "Disease Surveillance",
];

const OUTREACH_EVENTS: usize = 8;
const OUTREACH_KINDS: [(OutreachEventType, &str); 4] = [
    (OutreachEventType::Immunization, "Mass Immunization Campaign"),
    (OutreachEventType::Screening, "Diabetes & Hypertension Screening"),
    (OutreachEventType::Deworming, "School Deworming Campaign"),
    (OutreachEventType::Education, "Malaria Prevention Education"),
];

/// Persons aged five and over that may be screened.
const SCREENED_PERSONS: usize = 100;
const SCREENING_TYPES: [ScreeningType; 5] = [
    ScreeningType::Tb,
    ScreeningType::Hiv,
    ScreeningType::Diabetes,
    ScreeningType::Hypertension,
    ScreeningType::Malnutrition,
];
const SCREENING_RESULTS: [ScreeningResult; 3] = [
    ScreeningResult::Negative,
    ScreeningResult::Positive,
    ScreeningResult::Inconclusive,
];

/// Two to eight visits per household by the CHV assigned to it.
pub fn seed_household_visits(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let households: Vec<_> = ctx
        .households
        .iter()
        .take(VISITED_HOUSEHOLDS)
        .map(|h| (h.id, h.assigned_chv_id, h.number_of_members))
        .collect();
    let mut rows = 0;

    for (household_id, chv_id, members) in households {
        let visits = ctx.rng.gen_range(2..=8);
        for _ in 0..visits {
            let visit_date = ctx.today - Duration::days(ctx.rng.gen_range(1..=180));
            let service_count = ctx.rng.gen_range(1..=3);
            let services_provided = VISIT_SERVICES
                .choose_multiple(&mut ctx.rng, service_count)
                .map(|s| s.to_string())
                .collect();
            let visit = HouseholdVisit {
                id: ctx.new_id(),
                household_id,
                chv_id,
                visit_date,
                visit_type: *pick(&mut ctx.rng, &VISIT_TYPES, "visit types")?,
                members_present: ctx.rng.gen_range(1..=members.max(1)),
                services_provided,
                findings: Some("Household members in good health".into()),
                action_taken: Some("Provided health education".into()),
                referrals_made: ctx.rng.gen_range(0..=2),
                next_visit_date: Some(visit_date + Duration::days(30)),
            };
            insert_household_visit(conn, &visit)?;
            rows += 1;
        }
    }

    tracing::info!(rows, "Seeded household visits");
    Ok(())
}

pub fn seed_outreach_events(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    for _ in 0..OUTREACH_EVENTS {
        let (event_type, name) = *pick(&mut ctx.rng, &OUTREACH_KINDS, "outreach kinds")?;
        let start_date = ctx.today - Duration::days(ctx.rng.gen_range(30..=180));
        let ward = pick(&mut ctx.rng, &ctx.wards, "wards")?;
        let (ward_id, location) = (ward.id, format!("{} Village", ward.name));
        let target_population: i32 = ctx.rng.gen_range(500..=3_000);
        let coverage = ctx.rng.gen_range(0.6..0.95);

        let mut commodities_used = BTreeMap::new();
        if let Some(commodity) = ctx.commodities.choose(&mut ctx.rng) {
            commodities_used.insert(commodity.commodity_code.clone(), ctx.rng.gen_range(50..=500));
        }

        let event = OutreachEvent {
            id: ctx.new_id(),
            name: name.into(),
            event_type,
            start_date,
            end_date: start_date + Duration::days(ctx.rng.gen_range(1..=5)),
            location,
            ward_id,
            target_population,
            people_reached: (f64::from(target_population) * coverage) as i32,
            organizing_facility_id: Some(ctx.random_facility_id()?),
            partners: Some("Ministry of Health, WHO".into()),
            services_offered: vec!["Screening".into(), "Treatment".into(), "Referrals".into()],
            commodities_used,
            budget: Some(f64::from(ctx.rng.gen_range(100_000..=500_000_i32))),
            actual_cost: Some(f64::from(ctx.rng.gen_range(80_000..=450_000_i32))),
            report: Some("Event successfully completed with good community turnout".into()),
        };
        insert_outreach_event(conn, &event)?;
        ctx.outreach_events.push(event);
    }

    tracing::info!(rows = ctx.outreach_events.len(), "Seeded outreach events");
    Ok(())
}

/// Up to three screenings for each of the first persons aged five or
/// over. Some are attributed to an outreach event.
pub fn seed_screenings(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let today = ctx.today;
    let persons: Vec<_> = ctx
        .persons
        .iter()
        .filter(|p| p.age_on(today) >= 5)
        .take(SCREENED_PERSONS)
        .map(|p| p.id)
        .collect();
    let events: Vec<_> = ctx.outreach_events.iter().map(|e| e.id).collect();
    let mut rows = 0;

    for person_id in persons {
        let count = ctx.rng.gen_range(0..=3);
        for _ in 0..count {
            let screening_date = today - Duration::days(ctx.rng.gen_range(1..=365));
            let follow_up_required = ctx.rng.gen_bool(0.5);
            let outreach_event_id = if ctx.rng.gen_bool(0.2) {
                events.choose(&mut ctx.rng).copied()
            } else {
                None
            };
            let screening = Screening {
                id: ctx.new_id(),
                person_id,
                screening_type: *pick(&mut ctx.rng, &SCREENING_TYPES, "screening types")?,
                screening_date,
                screened_by_id: Some(ctx.random_user_id()?),
                facility_id: Some(ctx.random_facility_id()?),
                outreach_event_id,
                result: *pick(&mut ctx.rng, &SCREENING_RESULTS, "screening results")?,
                result_details: BTreeMap::new(),
                follow_up_required,
                follow_up_date: follow_up_required.then(|| screening_date + Duration::days(30)),
                notes: None,
            };
            insert_screening(conn, &screening)?;
            rows += 1;
        }
    }

    tracing::info!(rows, "Seeded screenings");
    Ok(())
}
