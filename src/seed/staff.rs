use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, ymd, SeedContext};
use super::derive::sequence_number;
use super::error::SeedError;
use crate::db::{insert_staff_profile, insert_training, insert_training_attendance};
use crate::models::enums::Cadre;
use crate::models::*;

/// Clinical users that get a staff profile, in creation order.
const PROFILED_STAFF: usize = 30;

const INSTITUTIONS: [&str; 4] = [
    "Kenya Medical Training College",
    "University of Nairobi",
    "Moi University",
    "Kenyatta University",
];

const COURSES: [&str; 6] = [
    "Integrated Management of Childhood Illness (IMCI)",
    "Maternal Newborn Child Health",
    "TB DOTS Training",
    "HIV Testing and Counseling",
    "Infection Prevention and Control",
    "Emergency Obstetric Care",
];

const TRAININGS: usize = 10;

/// Pass mark for a training certificate.
const CERTIFICATE_SCORE: f64 = 80.0;

fn qualification(cadre: Cadre) -> &'static str {
    match cadre {
        Cadre::ClinicalOfficer => "Diploma in Clinical Medicine",
        Cadre::Nurse | Cadre::EnrolledNurse => "Diploma in Nursing",
        Cadre::LabTech => "Diploma in Medical Laboratory Sciences",
        Cadre::Pharmacist | Cadre::PharmaceuticalTech => "Bachelor of Pharmacy",
        _ => "Diploma in Health Sciences",
    }
}

fn licensing_body(cadre: Cadre) -> &'static str {
    match cadre {
        Cadre::Nurse | Cadre::EnrolledNurse => "Nursing Council of Kenya",
        _ => "Clinical Officers Council",
    }
}

/// Profiles for the first users whose role maps to a clinical cadre.
pub fn seed_staff_profiles(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let clinical: Vec<_> = ctx
        .users
        .iter()
        .filter_map(|u| u.role.cadre().map(|cadre| (u.user.id, cadre)))
        .take(PROFILED_STAFF)
        .collect();

    for (i, (user_id, cadre)) in clinical.into_iter().enumerate() {
        let employment_year = ctx.rng.gen_range(2015..=2023);
        let employment_month = ctx.rng.gen_range(1..=12);
        let profile = StaffProfile {
            id: ctx.new_id(),
            user_id,
            cadre,
            employee_number: sequence_number("WJR-EMP", 1_000 + i, 5),
            qualification: qualification(cadre).into(),
            institution: Some(pick(&mut ctx.rng, &INSTITUTIONS, "institutions")?.to_string()),
            graduation_year: Some(ctx.rng.gen_range(2005..=2020)),
            license_number: Some(format!("LIC{}", ctx.rng.gen_range(10_000..=99_999))),
            licensing_body: Some(licensing_body(cadre).into()),
            license_expiry: Some(ctx.today + Duration::days(ctx.rng.gen_range(365..=1_095))),
            specialization: None,
            years_of_experience: ctx.rng.gen_range(2..=20),
            primary_facility_id: Some(ctx.random_facility_id()?),
            employment_date: ymd(employment_year, employment_month, 1)?,
            employment_status: "ACTIVE".into(),
        };
        insert_staff_profile(conn, &profile)?;
        ctx.staff.push(profile);
    }

    tracing::info!(rows = ctx.staff.len(), "Seeded staff profiles");
    Ok(())
}

pub fn seed_trainings(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    for i in 1..=TRAININGS {
        let start_date = ctx.today - Duration::days(ctx.rng.gen_range(30..=365));
        let end_date = start_date + Duration::days(ctx.rng.gen_range(3..=7));
        let venue = pick(&mut ctx.rng, &ctx.facilities, "facilities")?.name.clone();
        let training = Training {
            id: ctx.new_id(),
            course_name: pick(&mut ctx.rng, &COURSES, "courses")?.to_string(),
            course_code: Some(sequence_number("TRN", i, 3)),
            start_date,
            end_date,
            venue,
            trainer: "Ministry of Health Trainer".into(),
            training_organization: Some("Ministry of Health".into()),
            objectives: "Improve clinical skills and knowledge".into(),
            content_summary: None,
            budget: Some(f64::from(ctx.rng.gen_range(50_000..=200_000_i32))),
            organized_by_id: Some(ctx.random_user_id()?),
        };
        insert_training(conn, &training)?;
        ctx.trainings.push(training);
    }

    tracing::info!(rows = ctx.trainings.len(), "Seeded trainings");
    Ok(())
}

/// Five to twelve distinct profiled staff per training. Post-test scores
/// at or above the pass mark earn a certificate.
pub fn seed_training_attendance(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let training_ids: Vec<_> = ctx.trainings.iter().map(|t| t.id).collect();
    let mut rows = 0;
    let mut certificates = 0;

    for training_id in training_ids {
        let count = ctx.rng.gen_range(5..=12);
        let attendees: Vec<_> = ctx
            .staff
            .choose_multiple(&mut ctx.rng, count)
            .map(|s| s.id)
            .collect();
        for staff_id in attendees {
            let pre_test = f64::from(ctx.rng.gen_range(30..=60_i32));
            let post_test = f64::from(ctx.rng.gen_range(55..=95_i32));
            let certified = post_test >= CERTIFICATE_SCORE;
            if certified {
                certificates += 1;
            }
            let attendance = TrainingAttendance {
                id: ctx.new_id(),
                training_id,
                staff_id,
                attended: true,
                attendance_percentage: f64::from(ctx.rng.gen_range(70..=100_i32)),
                pre_test_score: Some(pre_test),
                post_test_score: Some(post_test),
                certificate_issued: certified,
                certificate_number: certified
                    .then(|| sequence_number("CERT-WJR-", certificates, 5)),
                feedback: None,
            };
            insert_training_attendance(conn, &attendance)?;
            rows += 1;
        }
    }

    tracing::info!(rows, certificates, "Seeded training attendance");
    Ok(())
}
