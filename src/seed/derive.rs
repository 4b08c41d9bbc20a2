//! Pure derivations used by the seed stages.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::models::enums::{DeathCategory, Gender};

/// Standard gestation counted from the last menstrual period.
pub const GESTATION_DAYS: i64 = 280;

/// Postpartum days at which PNC visits fall due.
pub const PNC_SCHEDULE_DAYS: [i64; 4] = [2, 7, 14, 42];

pub fn expected_delivery_date(lmp: NaiveDate) -> NaiveDate {
    lmp + Duration::days(GESTATION_DAYS)
}

/// Gestational week of the `visit_number`-th ANC visit (1-based).
pub fn anc_visit_week(visit_number: i32) -> i32 {
    12 + (visit_number - 1) * 8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaccineDose {
    pub name: &'static str,
    pub code: &'static str,
    pub dose: i32,
    pub min_age_weeks: i64,
}

const fn dose(name: &'static str, code: &'static str, dose: i32, min_age_weeks: i64) -> VaccineDose {
    VaccineDose {
        name,
        code,
        dose,
        min_age_weeks,
    }
}

/// Kenya EPI doses seeded for children under five.
pub const IMMUNIZATION_SCHEDULE: [VaccineDose; 6] = [
    dose("BCG", "BCG", 1, 0),
    dose("OPV", "OPV0", 1, 0),
    dose("Pentavalent", "PENTA1", 1, 6),
    dose("Pentavalent", "PENTA2", 2, 10),
    dose("Pentavalent", "PENTA3", 3, 14),
    dose("Measles", "MEASLES1", 1, 36),
];

impl VaccineDose {
    pub fn is_due(&self, age_weeks: i64) -> bool {
        age_weeks >= self.min_age_weeks
    }

    /// Earliest date the dose may be given to a child born on `dob`.
    pub fn earliest_date(&self, dob: NaiveDate) -> NaiveDate {
        dob + Duration::weeks(self.min_age_weeks)
    }
}

/// Fractional years between `dob` and `on`.
pub fn age_in_years(dob: NaiveDate, on: NaiveDate) -> f64 {
    (on - dob).num_days() as f64 / 365.25
}

/// Category of a death from the age at death.
///
/// Women of reproductive age (15 to 49) are split between MATERNAL and
/// ADULT by a coin toss from `rng`. This is a data-generation shortcut,
/// not a clinical rule: real maternal deaths depend on pregnancy status.
pub fn mortality_category<R: Rng + ?Sized>(
    age_years: f64,
    gender: Gender,
    rng: &mut R,
) -> DeathCategory {
    if age_years < 0.08 {
        DeathCategory::Neonatal
    } else if age_years < 1.0 {
        DeathCategory::Infant
    } else if age_years < 5.0 {
        DeathCategory::Child
    } else if gender == Gender::Female && (15.0..=49.0).contains(&age_years) {
        if rng.gen_bool(0.5) {
            DeathCategory::Maternal
        } else {
            DeathCategory::Adult
        }
    } else {
        DeathCategory::Adult
    }
}

/// `prefix` followed by `n` zero-padded to `width` digits.
pub fn sequence_number(prefix: &str, n: usize, width: usize) -> String {
    format!("{prefix}{n:0width$}")
}

/// Monetary amounts are stored to the cent.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn edd_is_280_days_after_lmp() {
        assert_eq!(expected_delivery_date(day(2024, 1, 1)), day(2024, 10, 7));
        assert_eq!(expected_delivery_date(day(2023, 3, 15)), day(2023, 12, 20));
    }

    #[test]
    fn anc_weeks_step_by_eight() {
        let weeks: Vec<i32> = (1..=4).map(anc_visit_week).collect();
        assert_eq!(weeks, vec![12, 20, 28, 36]);
    }

    #[test]
    fn vaccine_due_at_minimum_age() {
        let penta2 = IMMUNIZATION_SCHEDULE[3];
        assert_eq!(penta2.code, "PENTA2");
        assert!(!penta2.is_due(9));
        assert!(penta2.is_due(10));
        assert_eq!(penta2.earliest_date(day(2024, 1, 1)), day(2024, 3, 11));
        assert!(IMMUNIZATION_SCHEDULE.iter().filter(|d| d.is_due(0)).count() == 2);
    }

    #[test]
    fn mortality_category_boundaries() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(mortality_category(0.05, Gender::Female, &mut rng), DeathCategory::Neonatal);
        assert_eq!(mortality_category(0.5, Gender::Female, &mut rng), DeathCategory::Infant);
        assert_eq!(mortality_category(3.0, Gender::Male, &mut rng), DeathCategory::Child);
        assert_eq!(mortality_category(30.0, Gender::Male, &mut rng), DeathCategory::Adult);
        assert_eq!(mortality_category(60.0, Gender::Female, &mut rng), DeathCategory::Adult);
        assert_eq!(mortality_category(10.0, Gender::Female, &mut rng), DeathCategory::Adult);
    }

    #[test]
    fn reproductive_age_women_split_maternal_or_adult() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: Vec<DeathCategory> = (0..64)
            .map(|_| mortality_category(30.0, Gender::Female, &mut rng))
            .collect();
        assert!(seen
            .iter()
            .all(|c| matches!(c, DeathCategory::Maternal | DeathCategory::Adult)));
        assert!(seen.contains(&DeathCategory::Maternal));
        assert!(seen.contains(&DeathCategory::Adult));
    }

    #[test]
    fn age_is_fractional() {
        let age = age_in_years(day(2020, 1, 1), day(2020, 7, 2));
        assert!(age > 0.49 && age < 0.51);
    }

    #[test]
    fn sequence_numbers_are_zero_padded() {
        assert_eq!(sequence_number("REF-WJR-", 1, 6), "REF-WJR-000001");
        assert_eq!(sequence_number("CHV", 42, 5), "CHV00042");
        assert_eq!(sequence_number("HC", 12345, 4), "HC12345");
    }

    #[test]
    fn money_rounds_to_cents() {
        assert_eq!(round_cents(12.345_6), 12.35);
        assert_eq!(round_cents(99.0), 99.0);
    }
}
