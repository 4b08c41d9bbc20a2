use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

use super::access::{create_user, NewUser};
use super::context::{pick, random_date_in, SeedContext};
use super::derive::sequence_number;
use super::error::SeedError;
use crate::db::{insert_chv, insert_community_unit, insert_facility};
use crate::models::enums::{FacilityType, Gender, RoleName};
use crate::models::*;

/// (name, code, type, ward index, beds, latitude, longitude)
const MAJOR_FACILITIES: [(&str, &str, FacilityType, usize, i32, f64, f64); 3] = [
    (
        "Wajir County Referral Hospital",
        "WCRH001",
        FacilityType::CountyReferral,
        5,
        150,
        1.7471,
        40.0573,
    ),
    (
        "Habaswein Sub-County Hospital",
        "HSCH002",
        FacilityType::SubCountyHospital,
        12,
        80,
        1.5234,
        39.9876,
    ),
    (
        "Tarbaj Sub-County Hospital",
        "TSCH003",
        FacilityType::SubCountyHospital,
        16,
        60,
        1.8923,
        40.2341,
    ),
];

const HEALTH_CENTRES: [&str; 12] = [
    "Wagberi", "Barwaqo", "Bute", "Hadado", "Ganyure", "Iftin", "Diif", "Benane", "Wargadud",
    "Elben", "Della", "Lakoley",
];

const DISPENSARIES: [&str; 10] = [
    "Danyere",
    "Gurar",
    "Batalu",
    "Khorof Harar",
    "Ademasajide",
    "Lagboghol",
    "Sarman",
    "Elnur",
    "Goreale",
    "Diff",
];

const CHV_FIRST_NAMES: [&str; 15] = [
    "Abdi", "Fatuma", "Hassan", "Halima", "Omar", "Amina", "Yusuf", "Zamzam", "Ali", "Maryam",
    "Ibrahim", "Safia", "Mohamed", "Asha", "Ahmed",
];

pub(crate) const COMMUNITY_LAST_NAMES: [&str; 10] = [
    "Ali", "Ibrahim", "Mohamed", "Hassan", "Abdi", "Hussein", "Ahmed", "Omar", "Yusuf", "Osman",
];

/// Wards that get a community unit, in ward order.
const COMMUNITY_UNIT_WARDS: usize = 15;

struct FacilityDraft {
    name: String,
    code: String,
    facility_type: FacilityType,
    ward: usize,
    beds: i32,
    coordinates: Option<(f64, f64)>,
    email: Option<String>,
}

/// Three hospitals, then health centres and dispensaries. One counter
/// runs through all of them and feeds codes and phone numbers.
pub fn seed_facilities(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let ward_count = ctx.wards.len();
    if ward_count == 0 {
        return Err(SeedError::EmptyCollection { what: "wards" });
    }

    let mut drafts = Vec::new();
    for (name, code, facility_type, ward, beds, lat, lon) in MAJOR_FACILITIES {
        drafts.push(FacilityDraft {
            name: name.into(),
            code: code.into(),
            facility_type,
            ward: ward % ward_count,
            beds,
            coordinates: Some((lat, lon)),
            email: Some(format!("{}@wajir.health.go.ke", code.to_lowercase())),
        });
    }

    let mut counter = 100 + drafts.len();
    for (i, name) in HEALTH_CENTRES.into_iter().enumerate() {
        drafts.push(FacilityDraft {
            name: format!("{name} HC"),
            code: sequence_number("HC", counter, 4),
            facility_type: FacilityType::HealthCentre,
            ward: i % ward_count,
            beds: ctx.rng.gen_range(20..=40),
            coordinates: None,
            email: None,
        });
        counter += 1;
    }
    for name in DISPENSARIES {
        drafts.push(FacilityDraft {
            name: format!("{name} Dispensary"),
            code: sequence_number("DISP", counter, 4),
            facility_type: FacilityType::Dispensary,
            ward: ctx.rng.gen_range(0..ward_count),
            beds: ctx.rng.gen_range(5..=15),
            coordinates: None,
            email: None,
        });
        counter += 1;
    }

    for (i, draft) in drafts.into_iter().enumerate() {
        let ward = &ctx.wards[draft.ward];
        let (ward_id, subcounty_id) = (ward.id, ward.subcounty_id);
        let facility = Facility {
            id: ctx.new_id(),
            name: draft.name,
            facility_code: draft.code,
            facility_type: draft.facility_type,
            ward_id,
            subcounty_id,
            latitude: draft.coordinates.map(|c| c.0),
            longitude: draft.coordinates.map(|c| c.1),
            phone: Some(format!("+254720{:06}", 100 + i)),
            email: draft.email,
            physical_address: None,
            is_operational: true,
            bed_capacity: Some(draft.beds),
        };
        insert_facility(conn, &facility)?;
        ctx.facilities.push(facility);
    }

    tracing::info!(rows = ctx.facilities.len(), "Seeded facilities");
    Ok(())
}

/// One unit for each of the first wards, linked to a facility in the
/// same ward when there is one.
pub fn seed_community_units(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let wards: Vec<Ward> = ctx.wards.iter().take(COMMUNITY_UNIT_WARDS).cloned().collect();
    for (i, ward) in wards.iter().enumerate() {
        let local: Vec<Uuid> = ctx
            .facilities
            .iter()
            .filter(|f| f.ward_id == ward.id)
            .map(|f| f.id)
            .collect();
        let linked = if local.is_empty() {
            ctx.random_facility_id()?
        } else {
            *pick(&mut ctx.rng, &local, "facilities in ward")?
        };
        let unit = CommunityUnit {
            id: ctx.new_id(),
            name: format!("{} CHU", ward.name),
            code: sequence_number("CHU", i + 1, 3),
            ward_id: ward.id,
            linked_facility_id: Some(linked),
            target_population: ctx.rng.gen_range(3_000..=8_000),
            target_households: Some(ctx.rng.gen_range(500..=1_200)),
            is_active: true,
            established_date: Some(random_date_in(&mut ctx.rng, 2018)?),
        };
        insert_community_unit(conn, &unit)?;
        ctx.community_units.push(unit);
    }

    tracing::info!(rows = ctx.community_units.len(), "Seeded community units");
    Ok(())
}

/// Five to ten volunteers per unit, each with a CHV login scoped to the
/// unit's sub-county.
pub fn seed_chvs(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let units: Vec<(Uuid, Uuid)> = ctx
        .community_units
        .iter()
        .map(|u| (u.id, u.ward_id))
        .collect();

    let mut counter = 1;
    for (unit_id, ward_id) in units {
        let subcounty_id = ctx.subcounty_of_ward(&ward_id)?;
        let volunteers = ctx.rng.gen_range(5..=10);
        for _ in 0..volunteers {
            let first_name = *pick(&mut ctx.rng, &CHV_FIRST_NAMES, "CHV first names")?;
            let last_name = *pick(&mut ctx.rng, &COMMUNITY_LAST_NAMES, "CHV last names")?;
            let gender = if ctx.rng.gen_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            };
            let national_id = (67_890_000 + counter).to_string();
            let birth_year = ctx.rng.gen_range(1985..=2000);

            let user_id = create_user(
                conn,
                ctx,
                NewUser {
                    email: format!("chv{counter:04}@wajir.health.go.ke"),
                    phone: format!("+254721{counter:06}"),
                    first_name,
                    last_name,
                    national_id: national_id.clone(),
                    subcounty_id: Some(subcounty_id),
                    role: RoleName::Chv,
                },
            )?;

            let chv = CommunityHealthVolunteer {
                id: ctx.new_id(),
                user_id,
                community_unit_id: unit_id,
                national_id,
                chv_number: sequence_number("CHV", counter, 5),
                date_of_birth: random_date_in(&mut ctx.rng, birth_year)?,
                gender,
                training_date: Some(random_date_in(&mut ctx.rng, 2019)?),
                certification_date: Some(random_date_in(&mut ctx.rng, 2020)?),
                certification_expiry: None,
                is_active: true,
                households_assigned: ctx.rng.gen_range(20..=40),
            };
            insert_chv(conn, &chv)?;
            ctx.chvs.push(chv);
            counter += 1;
        }
    }

    tracing::info!(rows = ctx.chvs.len(), "Seeded CHVs");
    Ok(())
}
