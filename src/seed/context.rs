//! State threaded through the seed stages.
//!
//! Each stage reads the collections built by the stages before it and
//! appends its own. The RNG is seeded once per run, so a fixed seed and a
//! fixed `today` reproduce the same dataset, ids included.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::{Builder, Uuid};

use super::error::SeedError;
use crate::config::SeedConfig;
use crate::crypto::hash_password;
use crate::models::enums::RoleName;
use crate::models::*;

/// A created user together with the role it was given.
#[derive(Debug, Clone)]
pub struct SeededUser {
    pub user: User,
    pub role: RoleName,
}

pub struct SeedContext {
    pub rng: StdRng,
    pub today: NaiveDate,
    /// Shared by every seeded account; hashed once per run.
    pub password_hash: String,

    pub county: Option<County>,
    pub subcounties: Vec<SubCounty>,
    pub wards: Vec<Ward>,
    pub roles: HashMap<RoleName, Role>,
    pub users: Vec<SeededUser>,
    pub facilities: Vec<Facility>,
    pub community_units: Vec<CommunityUnit>,
    pub chvs: Vec<CommunityHealthVolunteer>,
    pub households: Vec<Household>,
    pub persons: Vec<Person>,
    pub commodities: Vec<Commodity>,
    pub suppliers: Vec<Supplier>,
    pub stocks: Vec<Stock>,
    pub programs: Vec<Program>,
    pub staff: Vec<StaffProfile>,
    pub pregnancies: Vec<PregnancyRecord>,
    pub trainings: Vec<Training>,
    pub outreach_events: Vec<OutreachEvent>,
    pub referrals: Vec<Referral>,
}

impl SeedContext {
    pub fn new(config: &SeedConfig) -> Result<Self, SeedError> {
        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        let password_hash = hash_password(&config.password, config.password_iterations, &mut rng)?;
        Ok(Self {
            rng,
            today: config.today,
            password_hash,
            county: None,
            subcounties: Vec::new(),
            wards: Vec::new(),
            roles: HashMap::new(),
            users: Vec::new(),
            facilities: Vec::new(),
            community_units: Vec::new(),
            chvs: Vec::new(),
            households: Vec::new(),
            persons: Vec::new(),
            commodities: Vec::new(),
            suppliers: Vec::new(),
            stocks: Vec::new(),
            programs: Vec::new(),
            staff: Vec::new(),
            pregnancies: Vec::new(),
            trainings: Vec::new(),
            outreach_events: Vec::new(),
            referrals: Vec::new(),
        })
    }

    /// A v4 UUID drawn from the run's RNG.
    pub fn new_id(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    /// Midnight at the start of `today`.
    pub fn now(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.today, NaiveTime::default())
    }

    pub fn county(&self) -> Result<&County, SeedError> {
        self.county
            .as_ref()
            .ok_or(SeedError::EmptyCollection { what: "counties" })
    }

    pub fn role(&self, name: RoleName) -> Result<&Role, SeedError> {
        self.roles
            .get(&name)
            .ok_or(SeedError::EmptyCollection { what: "roles" })
    }

    pub fn subcounty_of_ward(&self, ward_id: &Uuid) -> Result<Uuid, SeedError> {
        self.wards
            .iter()
            .find(|w| w.id == *ward_id)
            .map(|w| w.subcounty_id)
            .ok_or(SeedError::EmptyCollection { what: "wards" })
    }

    pub fn random_user_id(&mut self) -> Result<Uuid, SeedError> {
        Ok(pick(&mut self.rng, &self.users, "users")?.user.id)
    }

    pub fn random_facility_id(&mut self) -> Result<Uuid, SeedError> {
        Ok(pick(&mut self.rng, &self.facilities, "facilities")?.id)
    }

    pub fn random_ward_id(&mut self) -> Result<Uuid, SeedError> {
        Ok(pick(&mut self.rng, &self.wards, "wards")?.id)
    }

    /// Ids of users holding `role`, in creation order.
    pub fn user_ids_with_role(&self, role: RoleName) -> Vec<Uuid> {
        self.users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.user.id)
            .collect()
    }
}

/// Uniform choice from `items`; an empty slice is a seeding logic error.
pub fn pick<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    what: &'static str,
) -> Result<&'a T, SeedError> {
    items.choose(rng).ok_or(SeedError::EmptyCollection { what })
}

/// Calendar date from parts that are expected to be valid.
pub fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, SeedError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SeedError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
}

/// A date in `year` with a random month and a day that exists in every month.
pub fn random_date_in<R: Rng + ?Sized>(rng: &mut R, year: i32) -> Result<NaiveDate, SeedError> {
    ymd(year, rng.gen_range(1..=12), rng.gen_range(1..=28))
}
