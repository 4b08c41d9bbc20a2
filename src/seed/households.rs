use chrono::Duration;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

use super::context::{pick, random_date_in, SeedContext};
use super::derive::sequence_number;
use super::error::SeedError;
use super::facilities::COMMUNITY_LAST_NAMES;
use crate::db::{insert_household, insert_person};
use crate::models::enums::Gender;
use crate::models::*;

const VILLAGE_PREFIXES: [&str; 7] = ["Central", "East", "West", "North", "South", "Upper", "Lower"];
const WATER_SOURCES: [&str; 5] = ["Borehole", "River", "Rain Water", "Piped Water", "Water Vendor"];
const MAX_HOUSEHOLDS: usize = 2_000;

const MALE_NAMES: [&str; 10] = [
    "Abdi", "Hassan", "Omar", "Yusuf", "Ali", "Ibrahim", "Mohamed", "Ahmed", "Abdullahi", "Ismail",
];
const FEMALE_NAMES: [&str; 10] = [
    "Fatuma", "Halima", "Amina", "Zamzam", "Maryam", "Safia", "Asha", "Fadumo", "Habiba", "Suad",
];
const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Households whose members are registered as persons.
const REGISTERED_HOUSEHOLDS: usize = 500;

/// (min age, max age) brackets and their weights: under-fives, school
/// age, working age, elderly.
const AGE_BRACKETS: [(i64, i64); 4] = [(0, 5), (6, 17), (18, 60), (61, 85)];
const AGE_WEIGHTS: [f64; 4] = [0.2, 0.3, 0.4, 0.1];

/// 80 to 150 households per community unit, capped county-wide.
pub fn seed_households(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let units: Vec<CommunityUnit> = ctx.community_units.clone();
    let mut counter = 1;

    'units: for unit in &units {
        let ward_name = ctx
            .wards
            .iter()
            .find(|w| w.id == unit.ward_id)
            .map(|w| w.name.clone())
            .ok_or(SeedError::EmptyCollection { what: "wards" })?;
        let unit_chvs: Vec<_> = ctx
            .chvs
            .iter()
            .filter(|c| c.community_unit_id == unit.id)
            .map(|c| c.id)
            .collect();

        let planned = ctx.rng.gen_range(80..=150);
        for _ in 0..planned {
            let chv_id = *pick(&mut ctx.rng, &unit_chvs, "CHVs in community unit")?;
            let prefix = *pick(&mut ctx.rng, &VILLAGE_PREFIXES, "villages")?;
            let has_toilet = match ctx.rng.gen_range(0..3) {
                0 => Some(true),
                1 => Some(false),
                _ => None,
            };
            let household = Household {
                id: ctx.new_id(),
                household_number: sequence_number("WJR-HH", counter, 6),
                community_unit_id: unit.id,
                ward_id: unit.ward_id,
                assigned_chv_id: Some(chv_id),
                village: Some(format!("{prefix} {ward_name}")),
                physical_address: None,
                latitude: None,
                longitude: None,
                number_of_members: ctx.rng.gen_range(3..=12),
                has_toilet,
                water_source: Some(pick(&mut ctx.rng, &WATER_SOURCES, "water sources")?.to_string()),
                registration_date: random_date_in(&mut ctx.rng, 2020)?,
                is_active: true,
            };
            insert_household(conn, &household)?;
            ctx.households.push(household);
            counter += 1;
            if ctx.households.len() >= MAX_HOUSEHOLDS {
                tracing::warn!(limit = MAX_HOUSEHOLDS, "Household cap reached, remaining units left empty");
                break 'units;
            }
        }
    }

    tracing::info!(rows = ctx.households.len(), "Seeded households");
    Ok(())
}

/// One person per member for the first households; the first member
/// heads the household. Adults get a national id and, half the time, a
/// phone number.
pub fn seed_persons(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let households: Vec<(Uuid, i32)> = ctx
        .households
        .iter()
        .take(REGISTERED_HOUSEHOLDS)
        .map(|h| (h.id, h.number_of_members))
        .collect();
    let brackets = WeightedIndex::new(&AGE_WEIGHTS)
        .map_err(|_| SeedError::EmptyCollection { what: "age brackets" })?;

    let mut counter = 1;
    for (household_id, members) in households {
        for member in 0..members {
            let gender = if ctx.rng.gen_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            };
            let (min_age, max_age) = AGE_BRACKETS[brackets.sample(&mut ctx.rng)];
            let age = ctx.rng.gen_range(min_age..=max_age);
            let names: &[&str] = if gender == Gender::Male {
                &MALE_NAMES
            } else {
                &FEMALE_NAMES
            };
            let first_name = pick(&mut ctx.rng, names, "first names")?.to_string();
            let last_name = pick(&mut ctx.rng, &COMMUNITY_LAST_NAMES, "last names")?.to_string();
            let adult = age >= 18;
            let phone = (adult && ctx.rng.gen_bool(0.5)).then(|| format!("+254722{counter:06}"));
            // One slot past the end leaves the blood group unrecorded.
            let blood_group = BLOOD_GROUPS
                .get(ctx.rng.gen_range(0..=BLOOD_GROUPS.len()))
                .map(|g| g.to_string());

            let person = Person {
                id: ctx.new_id(),
                first_name,
                middle_name: None,
                last_name,
                date_of_birth: ctx.today - Duration::days(age * 365),
                gender,
                national_id: adult.then(|| (78_900_000 + counter).to_string()),
                nhif_number: None,
                birth_certificate_number: None,
                phone,
                alternate_phone: None,
                household_id,
                is_household_head: member == 0,
                blood_group,
                chronic_conditions: Vec::new(),
                allergies: None,
                is_alive: true,
                date_of_death: None,
            };
            insert_person(conn, &person)?;
            ctx.persons.push(person);
            counter += 1;
        }
    }

    tracing::info!(rows = ctx.persons.len(), "Seeded persons");
    Ok(())
}
