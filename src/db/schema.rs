//! Compile-time table registry and foreign-key delete policies.
//!
//! `Table::ALL` lists every data table in dependency order: a table only
//! references tables that appear before it. Clearing walks the list in
//! reverse so children are removed before their parents.

use rusqlite::Connection;

use super::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Counties,
    SubCounties,
    Wards,
    Roles,
    Users,
    UserRoles,
    Facilities,
    CommunityUnits,
    CommunityHealthVolunteers,
    Households,
    Persons,
    Commodities,
    Suppliers,
    Stocks,
    Programs,
    Indicators,
    StaffProfiles,
    PregnancyRecords,
    AncVisits,
    ImmunizationRecords,
    SurveillanceReports,
    MortalityReports,
    Trainings,
    HouseholdVisits,
    OutreachEvents,
    Screenings,
    Referrals,
    ReferralFollowUps,
    PncVisits,
    TrainingAttendance,
    MonthlyReports,
    Campaigns,
    CampaignWards,
    StockTransactions,
    ProcurementRequests,
    PurchaseOrders,
    LabTestOrders,
    LabResults,
}

impl Table {
    pub const ALL: [Table; 38] = [
        Table::Counties,
        Table::SubCounties,
        Table::Wards,
        Table::Roles,
        Table::Users,
        Table::UserRoles,
        Table::Facilities,
        Table::CommunityUnits,
        Table::CommunityHealthVolunteers,
        Table::Households,
        Table::Persons,
        Table::Commodities,
        Table::Suppliers,
        Table::Stocks,
        Table::Programs,
        Table::Indicators,
        Table::StaffProfiles,
        Table::PregnancyRecords,
        Table::AncVisits,
        Table::ImmunizationRecords,
        Table::SurveillanceReports,
        Table::MortalityReports,
        Table::Trainings,
        Table::HouseholdVisits,
        Table::OutreachEvents,
        Table::Screenings,
        Table::Referrals,
        Table::ReferralFollowUps,
        Table::PncVisits,
        Table::TrainingAttendance,
        Table::MonthlyReports,
        Table::Campaigns,
        Table::CampaignWards,
        Table::StockTransactions,
        Table::ProcurementRequests,
        Table::PurchaseOrders,
        Table::LabTestOrders,
        Table::LabResults,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Counties => "counties",
            Table::SubCounties => "subcounties",
            Table::Wards => "wards",
            Table::Roles => "roles",
            Table::Users => "users",
            Table::UserRoles => "user_roles",
            Table::Facilities => "facilities",
            Table::CommunityUnits => "community_units",
            Table::CommunityHealthVolunteers => "community_health_volunteers",
            Table::Households => "households",
            Table::Persons => "persons",
            Table::Commodities => "commodities",
            Table::Suppliers => "suppliers",
            Table::Stocks => "stocks",
            Table::Programs => "programs",
            Table::Indicators => "indicators",
            Table::StaffProfiles => "staff_profiles",
            Table::PregnancyRecords => "pregnancy_records",
            Table::AncVisits => "anc_visits",
            Table::ImmunizationRecords => "immunization_records",
            Table::SurveillanceReports => "surveillance_reports",
            Table::MortalityReports => "mortality_reports",
            Table::Trainings => "trainings",
            Table::HouseholdVisits => "household_visits",
            Table::OutreachEvents => "outreach_events",
            Table::Screenings => "screenings",
            Table::Referrals => "referrals",
            Table::ReferralFollowUps => "referral_follow_ups",
            Table::PncVisits => "pnc_visits",
            Table::TrainingAttendance => "training_attendance",
            Table::MonthlyReports => "monthly_reports",
            Table::Campaigns => "campaigns",
            Table::CampaignWards => "campaign_wards",
            Table::StockTransactions => "stock_transactions",
            Table::ProcurementRequests => "procurement_requests",
            Table::PurchaseOrders => "purchase_orders",
            Table::LabTestOrders => "lab_test_orders",
            Table::LabResults => "lab_results",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens to a referencing row when its parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    Cascade,
    SetNull,
    /// Parent delete is rejected while references exist.
    Protect,
}

impl DeletePolicy {
    /// The `ON DELETE` action SQLite reports for this policy.
    pub fn sql_action(&self) -> &'static str {
        match self {
            DeletePolicy::Cascade => "CASCADE",
            DeletePolicy::SetNull => "SET NULL",
            DeletePolicy::Protect => "RESTRICT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub child: Table,
    pub column: &'static str,
    pub parent: Table,
    pub on_delete: DeletePolicy,
}

const fn rel(child: Table, column: &'static str, parent: Table, on_delete: DeletePolicy) -> Relation {
    Relation {
        child,
        column,
        parent,
        on_delete,
    }
}

use DeletePolicy::{Cascade, Protect, SetNull};
use Table as T;

/// Every foreign key in the schema with its delete policy.
pub const RELATIONS: &[Relation] = &[
    rel(T::SubCounties, "county_id", T::Counties, Cascade),
    rel(T::Wards, "subcounty_id", T::SubCounties, Cascade),
    rel(T::Users, "county_id", T::Counties, SetNull),
    rel(T::Users, "subcounty_id", T::SubCounties, SetNull),
    rel(T::UserRoles, "user_id", T::Users, Cascade),
    rel(T::UserRoles, "role_id", T::Roles, Cascade),
    rel(T::Facilities, "ward_id", T::Wards, Cascade),
    rel(T::Facilities, "subcounty_id", T::SubCounties, Cascade),
    rel(T::CommunityUnits, "ward_id", T::Wards, Cascade),
    rel(T::CommunityUnits, "linked_facility_id", T::Facilities, SetNull),
    rel(T::CommunityHealthVolunteers, "user_id", T::Users, Cascade),
    rel(T::CommunityHealthVolunteers, "community_unit_id", T::CommunityUnits, Cascade),
    rel(T::Households, "community_unit_id", T::CommunityUnits, Cascade),
    rel(T::Households, "ward_id", T::Wards, Cascade),
    rel(T::Households, "assigned_chv_id", T::CommunityHealthVolunteers, SetNull),
    rel(T::Persons, "household_id", T::Households, Cascade),
    rel(T::PregnancyRecords, "woman_id", T::Persons, Cascade),
    rel(T::PregnancyRecords, "delivery_facility_id", T::Facilities, SetNull),
    rel(T::AncVisits, "pregnancy_id", T::PregnancyRecords, Cascade),
    rel(T::AncVisits, "facility_id", T::Facilities, SetNull),
    rel(T::AncVisits, "attended_by_id", T::Users, SetNull),
    rel(T::ImmunizationRecords, "child_id", T::Persons, Cascade),
    rel(T::ImmunizationRecords, "administered_by_id", T::Users, SetNull),
    rel(T::ImmunizationRecords, "facility_id", T::Facilities, SetNull),
    rel(T::SurveillanceReports, "ward_id", T::Wards, Cascade),
    rel(T::SurveillanceReports, "facility_id", T::Facilities, SetNull),
    rel(T::SurveillanceReports, "reported_by_id", T::Users, SetNull),
    rel(T::MortalityReports, "deceased_person_id", T::Persons, SetNull),
    rel(T::MortalityReports, "facility_id", T::Facilities, SetNull),
    rel(T::MortalityReports, "ward_id", T::Wards, Cascade),
    rel(T::MortalityReports, "reported_by_id", T::Users, SetNull),
    rel(T::HouseholdVisits, "household_id", T::Households, Cascade),
    rel(T::HouseholdVisits, "chv_id", T::CommunityHealthVolunteers, SetNull),
    rel(T::OutreachEvents, "ward_id", T::Wards, Cascade),
    rel(T::OutreachEvents, "organizing_facility_id", T::Facilities, SetNull),
    rel(T::Screenings, "person_id", T::Persons, Cascade),
    rel(T::Screenings, "screened_by_id", T::Users, SetNull),
    rel(T::Screenings, "facility_id", T::Facilities, SetNull),
    rel(T::Screenings, "outreach_event_id", T::OutreachEvents, SetNull),
    rel(T::Referrals, "person_id", T::Persons, Cascade),
    rel(T::Referrals, "from_facility_id", T::Facilities, SetNull),
    rel(T::Referrals, "to_facility_id", T::Facilities, SetNull),
    rel(T::Referrals, "referred_by_id", T::Users, SetNull),
    rel(T::Referrals, "accepted_by_id", T::Users, SetNull),
    rel(T::ReferralFollowUps, "referral_id", T::Referrals, Cascade),
    rel(T::ReferralFollowUps, "followed_up_by_id", T::Users, SetNull),
    rel(T::PncVisits, "pregnancy_id", T::PregnancyRecords, Cascade),
    rel(T::PncVisits, "facility_id", T::Facilities, SetNull),
    rel(T::PncVisits, "attended_by_id", T::Users, SetNull),
    rel(T::Programs, "county_id", T::Counties, Cascade),
    rel(T::Programs, "program_manager_id", T::Users, SetNull),
    rel(T::Indicators, "program_id", T::Programs, Cascade),
    rel(T::MonthlyReports, "facility_id", T::Facilities, Cascade),
    rel(T::MonthlyReports, "subcounty_id", T::SubCounties, Cascade),
    rel(T::MonthlyReports, "submitted_by_id", T::Users, SetNull),
    rel(T::MonthlyReports, "approved_by_id", T::Users, SetNull),
    rel(T::Campaigns, "program_id", T::Programs, Cascade),
    rel(T::Campaigns, "campaign_manager_id", T::Users, SetNull),
    rel(T::CampaignWards, "campaign_id", T::Campaigns, Cascade),
    rel(T::CampaignWards, "ward_id", T::Wards, Cascade),
    rel(T::Stocks, "commodity_id", T::Commodities, Cascade),
    rel(T::Stocks, "facility_id", T::Facilities, Cascade),
    rel(T::Stocks, "updated_by_id", T::Users, SetNull),
    rel(T::StockTransactions, "stock_id", T::Stocks, Cascade),
    rel(T::StockTransactions, "from_facility_id", T::Facilities, SetNull),
    rel(T::StockTransactions, "to_facility_id", T::Facilities, SetNull),
    rel(T::StockTransactions, "performed_by_id", T::Users, SetNull),
    rel(T::StockTransactions, "approved_by_id", T::Users, SetNull),
    rel(T::ProcurementRequests, "facility_id", T::Facilities, Cascade),
    rel(T::ProcurementRequests, "requested_by_id", T::Users, SetNull),
    rel(T::ProcurementRequests, "reviewed_by_id", T::Users, SetNull),
    rel(T::ProcurementRequests, "approved_by_id", T::Users, SetNull),
    rel(T::PurchaseOrders, "supplier_id", T::Suppliers, Protect),
    rel(T::PurchaseOrders, "procurement_request_id", T::ProcurementRequests, SetNull),
    rel(T::PurchaseOrders, "created_by_id", T::Users, SetNull),
    rel(T::PurchaseOrders, "approved_by_id", T::Users, SetNull),
    rel(T::LabTestOrders, "patient_id", T::Persons, Cascade),
    rel(T::LabTestOrders, "facility_id", T::Facilities, Cascade),
    rel(T::LabTestOrders, "ordered_by_id", T::Users, SetNull),
    rel(T::LabTestOrders, "sample_collected_by_id", T::Users, SetNull),
    rel(T::LabResults, "lab_order_id", T::LabTestOrders, Cascade),
    rel(T::LabResults, "tested_by_id", T::Users, SetNull),
    rel(T::LabResults, "verified_by_id", T::Users, SetNull),
    rel(T::StaffProfiles, "user_id", T::Users, Cascade),
    rel(T::StaffProfiles, "primary_facility_id", T::Facilities, SetNull),
    rel(T::Trainings, "organized_by_id", T::Users, SetNull),
    rel(T::TrainingAttendance, "training_id", T::Trainings, Cascade),
    rel(T::TrainingAttendance, "staff_id", T::StaffProfiles, Cascade),
];

pub fn count_rows(conn: &Connection, table: Table) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Row counts for every table, in dependency order.
pub fn table_counts(conn: &Connection) -> Result<Vec<(Table, i64)>, DatabaseError> {
    Table::ALL
        .iter()
        .map(|&t| Ok((t, count_rows(conn, t)?)))
        .collect()
}

/// Delete every row from every data table, children first.
pub fn clear_all(conn: &Connection) -> Result<(), DatabaseError> {
    for table in Table::ALL.iter().rev() {
        let removed = conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
        if removed > 0 {
            tracing::debug!(table = table.name(), removed, "Cleared table");
        }
    }
    Ok(())
}
