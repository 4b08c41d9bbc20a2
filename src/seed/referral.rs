use chrono::Duration;
use rand::Rng;
use rusqlite::Connection;

use super::context::{pick, SeedContext};
use super::derive::sequence_number;
use super::error::SeedError;
use crate::db::{insert_referral, insert_referral_follow_up};
use crate::models::enums::{ReferralStatus, ReferralUrgency, RoleName};
use crate::models::*;

/// Persons considered for a referral, in registration order.
const CANDIDATE_PATIENTS: usize = 30;
const REFERRAL_RATE: f64 = 0.3;

/// Referring facilities are drawn from the first facilities.
const REFERRING_FACILITIES: usize = 10;

const STATUSES: [ReferralStatus; 4] = [
    ReferralStatus::Pending,
    ReferralStatus::Accepted,
    ReferralStatus::Arrived,
    ReferralStatus::Completed,
];

/// Referrals from lower-level facilities to a referral hospital. The
/// timestamps filled in follow how far the referral has progressed.
pub fn seed_referrals(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let patients: Vec<_> = ctx
        .persons
        .iter()
        .take(CANDIDATE_PATIENTS)
        .map(|p| p.id)
        .collect();
    let referring: Vec<_> = ctx
        .facilities
        .iter()
        .take(REFERRING_FACILITIES)
        .map(|f| f.id)
        .collect();
    let hospitals: Vec<_> = ctx
        .facilities
        .iter()
        .filter(|f| f.facility_type.is_referral_hospital())
        .map(|f| f.id)
        .collect();
    let now = ctx.now();

    for person_id in patients {
        if !ctx.rng.gen_bool(REFERRAL_RATE) {
            continue;
        }
        let referral_date = now - Duration::days(ctx.rng.gen_range(1..=90));
        let status = *pick(&mut ctx.rng, &STATUSES, "referral statuses")?;
        let accepted = status != ReferralStatus::Pending;
        let arrived = matches!(status, ReferralStatus::Arrived | ReferralStatus::Completed);
        let completed = status == ReferralStatus::Completed;

        let referral = Referral {
            id: ctx.new_id(),
            referral_number: sequence_number("REF-WJR-", ctx.referrals.len() + 1, 6),
            person_id,
            from_facility_id: Some(*pick(&mut ctx.rng, &referring, "referring facilities")?),
            to_facility_id: Some(*pick(&mut ctx.rng, &hospitals, "referral hospitals")?),
            referred_by_id: Some(ctx.random_user_id()?),
            referral_date,
            urgency: *pick(&mut ctx.rng, ReferralUrgency::ALL, "urgencies")?,
            reason: "Patient requires specialized care not available at referring facility".into(),
            diagnosis: Some("Suspected complicated malaria".into()),
            treatment_given: Some("Initial antimalarials administered".into()),
            status,
            accepted_by_id: if accepted { Some(ctx.random_user_id()?) } else { None },
            accepted_date: accepted.then(|| referral_date + Duration::hours(2)),
            arrival_date: arrived.then(|| referral_date + Duration::hours(4)),
            completion_date: completed.then(|| (referral_date + Duration::days(3)).min(now)),
            outcome: completed.then(|| "Patient treated and stabilized".to_string()),
            feedback_to_referring_facility: completed
                .then(|| "Patient responded well to treatment".to_string()),
        };
        insert_referral(conn, &referral)?;
        ctx.referrals.push(referral);
    }

    tracing::info!(rows = ctx.referrals.len(), "Seeded referrals");
    Ok(())
}

fn status_update(status: ReferralStatus) -> &'static str {
    match status {
        ReferralStatus::Accepted | ReferralStatus::InTransit => "Receiving facility confirmed bed",
        ReferralStatus::Arrived => "Patient arrived and under review",
        ReferralStatus::Completed => "Patient discharged back to community",
        _ => "Awaiting response from receiving facility",
    }
}

/// One follow-up by a CHV for every referral the receiving side has
/// acted on.
pub fn seed_referral_follow_ups(conn: &Connection, ctx: &mut SeedContext) -> Result<(), SeedError> {
    let acted_on: Vec<_> = ctx
        .referrals
        .iter()
        .filter(|r| r.status != ReferralStatus::Pending)
        .map(|r| (r.id, r.referral_date, r.status))
        .collect();
    let chvs = ctx.user_ids_with_role(RoleName::Chv);
    let now = ctx.now();

    for (referral_id, referral_date, status) in &acted_on {
        let follow_up = ReferralFollowUp {
            id: ctx.new_id(),
            referral_id: *referral_id,
            follow_up_date: (*referral_date + Duration::days(1)).min(now),
            followed_up_by_id: Some(*pick(&mut ctx.rng, &chvs, "CHVs")?),
            status_update: status_update(*status).into(),
            notes: None,
            action_taken: Some("Family informed of referral progress".into()),
        };
        insert_referral_follow_up(conn, &follow_up)?;
    }

    tracing::info!(rows = acted_on.len(), "Seeded referral follow-ups");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_up_text_tracks_status() {
        assert_eq!(
            status_update(ReferralStatus::Completed),
            "Patient discharged back to community"
        );
        assert_ne!(
            status_update(ReferralStatus::Accepted),
            status_update(ReferralStatus::Arrived)
        );
    }
}
