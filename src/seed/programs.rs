use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

use super::context::{pick, ymd, SeedContext};
use super::derive::round_cents;
use super::error::SeedError;
use crate::db::{
    approve_monthly_reports, insert_campaign, insert_indicator, insert_monthly_report,
    insert_program,
};
use crate::models::enums::{CampaignStatus, IndicatorType, RoleName};
use crate::models::*;

/// (name, code, description, campaign type)
const PROGRAMS: [(&str, &str, &str, &str); 4] = [
    ("Maternal & Child Health", "MCH", "Maternal and child health services", "Immunization"),
    ("Malaria Control", "MAL", "Malaria prevention and treatment", "Bed Net Distribution"),
    ("TB Control", "TB", "Tuberculosis prevention and treatment", "Case Finding"),
    ("HIV/AIDS Program", "HIV", "HIV prevention, testing, and treatment", "Testing"),
];

const INDICATORS_PER_PROGRAM: usize = 3;
const INDICATOR_TYPES: [IndicatorType; 3] =
    [IndicatorType::Output, IndicatorType::Outcome, IndicatorType::Impact];

/// Facilities that file monthly returns, and how many past months.
const REPORTING_FACILITIES: usize = 10;
const REPORTED_MONTHS: i32 = 3;

/// Programs managed by public health officers, three indicators each.
pub fn seed_programs(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let county_id = ctx.county()?.id;
    let officers = ctx.user_ids_with_role(RoleName::PublicHealthOfficer);
    let start_date = ymd(2020, 1, 1)?;
    let mut indicators = 0;

    for (name, code, description, _) in PROGRAMS {
        let program = Program {
            id: ctx.new_id(),
            name: name.into(),
            code: code.into(),
            description: description.into(),
            start_date,
            end_date: None,
            county_id,
            program_manager_id: Some(*pick(&mut ctx.rng, &officers, "public health officers")?),
            budget: Some(f64::from(ctx.rng.gen_range(5_000_000..=20_000_000_i32))),
            is_active: true,
        };
        insert_program(conn, &program)?;

        for n in 1..=INDICATORS_PER_PROGRAM {
            let indicator = Indicator {
                id: ctx.new_id(),
                program_id: program.id,
                name: format!("{name} Indicator {n}"),
                code: format!("{code}-IND{n}"),
                indicator_type: *pick(&mut ctx.rng, &INDICATOR_TYPES, "indicator types")?,
                definition: format!("Indicator definition for {name}"),
                numerator_definition: "Number of cases".into(),
                denominator_definition: Some("Target population".into()),
                calculation_method: "(Numerator/Denominator) * 100".into(),
                target_value: Some(f64::from(ctx.rng.gen_range(60..=95_i32))),
                baseline_value: Some(f64::from(ctx.rng.gen_range(30..=60_i32))),
                reporting_frequency: "Monthly".into(),
                is_active: true,
            };
            insert_indicator(conn, &indicator)?;
            indicators += 1;
        }
        ctx.programs.push(program);
    }

    tracing::info!(
        programs = ctx.programs.len(),
        indicators,
        "Seeded programs and indicators"
    );
    Ok(())
}

/// (year, month) of the `back`-th complete month before `today`'s month.
fn month_before(year: i32, month: u32, back: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Monthly returns for the last complete months. Everything but the most
/// recent month is approved by the M&E officer.
pub fn seed_monthly_reports(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let clerks = ctx.user_ids_with_role(RoleName::DataClerk);
    let approver = ctx
        .user_ids_with_role(RoleName::MeOfficer)
        .first()
        .copied()
        .ok_or(SeedError::EmptyCollection { what: "M&E officers" })?;
    let facility_ids: Vec<_> = ctx
        .facilities
        .iter()
        .take(REPORTING_FACILITIES)
        .map(|f| f.id)
        .collect();
    let (year, month) = (ctx.today.year(), ctx.today.month());

    let mut inserted = 0;
    let mut to_approve = Vec::new();
    for facility_id in facility_ids {
        for back in 1..=REPORTED_MONTHS {
            let (report_year, report_month) = month_before(year, month, back);
            let (next_year, next_month) = month_before(year, month, back - 1);
            let submitted = NaiveDateTime::new(ymd(next_year, next_month, 5)?, NaiveTime::default());

            let anc_visits = ctx.rng.gen_range(20..=120);
            let mut indicators = BTreeMap::new();
            indicators.insert(
                "anc_coverage".to_string(),
                round_cents(ctx.rng.gen_range(40.0..95.0)),
            );
            indicators.insert(
                "immunization_coverage".to_string(),
                round_cents(ctx.rng.gen_range(50.0..98.0)),
            );

            let report = MonthlyReport {
                id: ctx.new_id(),
                facility_id: Some(facility_id),
                subcounty_id: None,
                year: report_year,
                month: report_month,
                outpatient_visits: ctx.rng.gen_range(300..=2_500),
                inpatient_admissions: ctx.rng.gen_range(0..=150),
                anc_visits,
                deliveries: ctx.rng.gen_range(0..=anc_visits / 3),
                immunizations_given: ctx.rng.gen_range(20..=300),
                malaria_cases: ctx.rng.gen_range(10..=400),
                tb_cases: ctx.rng.gen_range(0..=15),
                hiv_tests: ctx.rng.gen_range(20..=250),
                indicators,
                submitted_by_id: Some(*pick(&mut ctx.rng, &clerks, "data clerks")?),
                submission_date: submitted.min(ctx.now()),
                approved: false,
                approved_by_id: None,
                approval_date: None,
                notes: None,
            };
            insert_monthly_report(conn, &report)?;
            inserted += 1;
            if back > 1 {
                to_approve.push(report.id);
            }
        }
    }

    let approved = approve_monthly_reports(conn, &to_approve, &approver, ctx.now())?;
    tracing::info!(rows = inserted, approved, "Seeded monthly reports");
    Ok(())
}

/// One campaign per program, status following its dates.
pub fn seed_campaigns(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let programs: Vec<(Uuid, String, Option<Uuid>)> = ctx
        .programs
        .iter()
        .map(|p| (p.id, p.name.clone(), p.program_manager_id))
        .collect();
    let today = ctx.today;

    let campaign_types = PROGRAMS.map(|(_, _, _, kind)| kind);
    for ((program_id, name, manager), campaign_type) in programs.into_iter().zip(campaign_types) {
        let start_date = today + Duration::days(ctx.rng.gen_range(-90..=30));
        let end_date = start_date + Duration::days(ctx.rng.gen_range(7..=30));
        let status = if end_date < today {
            CampaignStatus::Completed
        } else if start_date > today {
            CampaignStatus::Planned
        } else {
            CampaignStatus::Ongoing
        };

        let ward_count = ctx.rng.gen_range(3..=6);
        let ward_ids: Vec<_> = ctx
            .wards
            .choose_multiple(&mut ctx.rng, ward_count)
            .map(|w| w.id)
            .collect();
        let target_population: i32 = ctx.rng.gen_range(2_000..=10_000);
        let budget = f64::from(ctx.rng.gen_range(500_000..=2_000_000_i32));
        let (people_reached, actual_expenditure) = match status {
            CampaignStatus::Planned => (0, 0.0),
            _ => {
                let share = ctx.rng.gen_range(0.4..0.95);
                (
                    (f64::from(target_population) * share) as i32,
                    round_cents(budget * share),
                )
            }
        };

        let campaign = Campaign {
            id: ctx.new_id(),
            program_id,
            name: format!("{name} {campaign_type} Campaign {}", start_date.year()),
            campaign_type: campaign_type.into(),
            start_date,
            end_date,
            target_area: "Wajir County".into(),
            ward_ids,
            target_population,
            people_reached,
            objectives: format!("Expand {} coverage in priority wards", campaign_type.to_lowercase()),
            activities: vec![
                "Community mobilisation".into(),
                "Service delivery".into(),
                "Data collection".into(),
            ],
            budget,
            actual_expenditure,
            campaign_manager_id: manager,
            status,
            final_report: (status == CampaignStatus::Completed)
                .then(|| "Targets largely met; scale up in remaining wards".to_string()),
        };
        insert_campaign(conn, &campaign)?;
    }

    tracing::info!(rows = ctx.programs.len(), "Seeded campaigns");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_roll_back_across_years() {
        assert_eq!(month_before(2024, 3, 1), (2024, 2));
        assert_eq!(month_before(2024, 1, 1), (2023, 12));
        assert_eq!(month_before(2024, 2, 3), (2023, 11));
        assert_eq!(month_before(2024, 6, 0), (2024, 6));
    }
}
